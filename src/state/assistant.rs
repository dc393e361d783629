//! Shopping-assistant widget state and response routing.
//!
//! The widget is self-contained: its transcript lives only for the mount,
//! nothing is persisted, and it never touches the admin-chat session. Each
//! user message is routed through a fixed keyword table first; only
//! unmatched messages go to the remote AI responder.

#[cfg(test)]
#[path = "assistant_test.rs"]
mod assistant_test;

/// Canned-response categories, in match-priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Greeting,
    Size,
    Return,
    Shipping,
    Payment,
    Admin,
}

/// Fixed iteration order for keyword matching. The first category whose
/// keyword list hits wins; there is no scoring among multiple matches.
pub const CATEGORY_ORDER: [Category; 6] = [
    Category::Greeting,
    Category::Size,
    Category::Return,
    Category::Shipping,
    Category::Payment,
    Category::Admin,
];

impl Category {
    /// Keywords matched as case-insensitive substrings of the message.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Greeting => &["xin chào", "hello", "chào bạn", "chào", "hey"],
            Self::Size => &[
                "size",
                "số đo",
                "kích thước",
                "kích cỡ",
                "chọn size",
                "size nào",
                "đo size",
                "bảng size",
            ],
            Self::Return => &[
                "đổi trả",
                "đổi hàng",
                "trả hàng",
                "hoàn trả",
                "hoàn tiền",
                "bảo hành",
                "chính sách đổi",
                "chính sách trả",
            ],
            Self::Shipping => &[
                "ship",
                "giao hàng",
                "vận chuyển",
                "ship hàng",
                "phí ship",
                "miễn phí ship",
                "giao nhanh",
                "thời gian giao",
                "bao lâu nhận được",
            ],
            Self::Payment => &[
                "thanh toán",
                "payment",
                "chuyển khoản",
                "trả tiền",
                "phương thức thanh toán",
                "thanh toán thế nào",
                "cod",
                "vnpay",
            ],
            Self::Admin => &[
                "admin",
                "nhân viên",
                "tư vấn viên",
                "hỗ trợ",
                "support",
                "liên hệ admin",
            ],
        }
    }

    /// The canned reply for this category.
    #[must_use]
    pub fn canned_response(self) -> &'static str {
        match self {
            Self::Greeting => {
                "Xin chào! Tôi là trợ lý ảo được hỗ trợ bởi AI. Tôi có thể giúp bạn:\n\n\
                 🛍️ Tìm kiếm sản phẩm\n📏 Tư vấn chọn size\n🔄 Chính sách đổi trả\n\
                 🚚 Thông tin vận chuyển\n💳 Hướng dẫn thanh toán\n\n\
                 💬 Hãy hỏi tôi bất cứ điều gì!"
            }
            Self::Size => {
                "📏 HƯỚNG DẪN CHỌN SIZE:\n\n• Size S: 45-52kg (Cao 1m50-1m60)\n\
                 • Size M: 53-58kg (Cao 1m60-1m68)\n• Size L: 59-65kg (Cao 1m68-1m75)\n\
                 • Size XL: 66-75kg (Cao 1m75-1m80)\n\n\
                 💡 Tip: Nếu bạn nằm giữa 2 size, hãy chọn size lớn hơn để thoải mái nhé!"
            }
            Self::Return => {
                "✅ CHÍNH SÁCH ĐỔI TRẢ:\n\n• Đổi size miễn phí trong 7 ngày\n\
                 • Sản phẩm chưa qua sử dụng, còn nguyên tag\n• Hoàn tiền 100% nếu lỗi từ shop\n\
                 • Đổi trả tại nhà miễn phí (nội thành HN, HCM)\n\n📞 Hotline hỗ trợ: 19001111"
            }
            Self::Shipping => {
                "🚚 THỜI GIAN GIAO HÀNG:\n\n• Nội thành HN/HCM: 1-2 ngày\n\
                 • Tỉnh thành khác: 2-4 ngày\n• Vùng xa: 4-7 ngày\n\n\
                 📦 Miễn phí ship đơn từ 300k\n⚡ Giao hàng nhanh +30k"
            }
            Self::Payment => {
                "💳 PHƯƠNG THỨC THANH TOÁN:\n\n• COD (Thanh toán khi nhận hàng)\n\
                 • Ví VNPay\n• Chuyển khoản ngân hàng\n\n🔒 Thanh toán an toàn, bảo mật 100%"
            }
            Self::Admin => {
                "⏳ Đang chuyển bạn sang trang chat với admin...\n\nVui lòng đợi trong giây lát!"
            }
        }
    }
}

/// Fallback reply when the AI responder is unreachable.
pub const OFFLINE_RESPONSE: &str =
    "Xin lỗi, tôi đang gặp sự cố kết nối. Vui lòng thử lại sau hoặc liên hệ admin.";

/// Where the admin-routing branch sends the user.
pub const ADMIN_CHAT_PATH: &str = "/profile/admin-chat";

/// First keyword found as a substring wins; categories are tried in
/// [`CATEGORY_ORDER`]. Matching is case-insensitive on the trimmed
/// message.
#[must_use]
pub fn match_category(message: &str) -> Option<Category> {
    let normalized = message.trim().to_lowercase();
    for category in CATEGORY_ORDER {
        for keyword in category.keywords() {
            if normalized.contains(keyword) {
                return Some(category);
            }
        }
    }
    None
}

/// What to do with a user message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Reply with the category's canned response.
    Canned(Category),
    /// Emit the transfer notice, then navigate to the admin chat.
    TransferToAdmin,
    /// No keyword matched: delegate to the remote AI responder.
    DelegateToAi,
}

/// Route a user message. Empty or whitespace-only input yields `None`:
/// no turn is recorded at all.
#[must_use]
pub fn route_message(message: &str) -> Option<RouteDecision> {
    if message.trim().is_empty() {
        return None;
    }
    Some(match match_category(message) {
        Some(Category::Admin) => RouteDecision::TransferToAdmin,
        Some(category) => RouteDecision::Canned(category),
        None => RouteDecision::DelegateToAi,
    })
}

/// Who authored a transcript turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

/// Provenance of a bot turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Canned,
    Ai,
    Error,
}

/// One transcript entry. No identity beyond position; the transcript is
/// discarded when the widget unmounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantTurn {
    pub content: String,
    pub author: Author,
    pub origin: Option<Origin>,
    pub created_at: String,
}

/// Transient widget state.
#[derive(Clone, Debug)]
pub struct AssistantState {
    pub turns: Vec<AssistantTurn>,
    /// Assigned by the responder on the first delegated turn, then reused
    /// for the rest of the mount.
    pub conversation_id: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    /// Result of the responder health check; an offline service disables
    /// the input.
    pub online: bool,
    greeted: bool,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            conversation_id: None,
            loading: false,
            error: None,
            online: true,
            greeted: false,
        }
    }
}

impl AssistantState {
    /// Seed the canned greeting the first time the panel opens. Returns
    /// `false` on later opens.
    pub fn greet_once(&mut self, created_at: String) -> bool {
        if self.greeted {
            return false;
        }
        self.greeted = true;
        self.turns.push(AssistantTurn {
            content: Category::Greeting.canned_response().to_owned(),
            author: Author::Bot,
            origin: Some(Origin::Canned),
            created_at,
        });
        true
    }

    /// Append the user's message. Always happens before routing decides
    /// what comes next.
    pub fn push_user(&mut self, content: String, created_at: String) {
        self.turns.push(AssistantTurn {
            content,
            author: Author::User,
            origin: None,
            created_at,
        });
    }

    /// Append a canned category reply.
    pub fn push_canned(&mut self, category: Category, created_at: String) {
        self.turns.push(AssistantTurn {
            content: category.canned_response().to_owned(),
            author: Author::Bot,
            origin: Some(Origin::Canned),
            created_at,
        });
    }

    /// Append an AI reply and adopt its conversation id.
    pub fn push_ai(&mut self, content: String, conversation_id: Option<String>, created_at: String) {
        if let Some(id) = conversation_id {
            self.conversation_id = Some(id);
        }
        self.turns.push(AssistantTurn {
            content,
            author: Author::Bot,
            origin: Some(Origin::Ai),
            created_at,
        });
    }

    /// Append the offline fallback and surface the banner.
    pub fn push_offline(&mut self, created_at: String) {
        self.error = Some("Không thể kết nối với AI. Vui lòng thử lại.".to_owned());
        self.turns.push(AssistantTurn {
            content: OFFLINE_RESPONSE.to_owned(),
            author: Author::Bot,
            origin: Some(Origin::Error),
            created_at,
        });
    }
}

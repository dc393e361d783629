use super::*;

// =============================================================
// Status classification
// =============================================================

#[test]
fn status_401_means_session_expired() {
    assert_eq!(classify_status(401, None), ApiError::SessionExpired);
    // The backend message never overrides the auth classification.
    assert_eq!(
        classify_status(401, Some("token invalid".to_owned())),
        ApiError::SessionExpired
    );
}

#[test]
fn status_403_means_forbidden_room() {
    assert_eq!(classify_status(403, None), ApiError::Forbidden);
}

#[test]
fn status_404_means_room_not_found() {
    assert_eq!(classify_status(404, None), ApiError::RoomNotFound);
}

#[test]
fn other_statuses_pass_backend_message_through() {
    assert_eq!(
        classify_status(500, Some("Phòng đã đóng".to_owned())),
        ApiError::Backend("Phòng đã đóng".to_owned())
    );
}

#[test]
fn other_statuses_without_message_report_the_code() {
    assert_eq!(
        classify_status(502, None),
        ApiError::Backend("Máy chủ trả về lỗi 502".to_owned())
    );
    assert_eq!(
        classify_status(500, Some("   ".to_owned())),
        ApiError::Backend("Máy chủ trả về lỗi 500".to_owned())
    );
}

#[test]
fn error_display_is_user_facing_copy() {
    assert_eq!(
        ApiError::SessionExpired.to_string(),
        "Phiên đăng nhập hết hạn. Vui lòng đăng nhập lại."
    );
    assert_eq!(
        ApiError::Backend("Phòng đã đóng".to_owned()).to_string(),
        "Phòng đã đóng"
    );
}

// =============================================================
// Native stubs
// =============================================================

#[test]
fn native_build_reports_unavailable() {
    let err = block_on_ready(fetch_my_room());
    assert_eq!(err, Err(ApiError::Unavailable));
}

/// Minimal executor for the stub futures, which resolve immediately.
fn block_on_ready<T>(fut: impl std::future::Future<Output = T>) -> T {
    use std::pin::pin;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn noop_raw_waker() -> RawWaker {
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        fn noop(_: *const ()) {}
        RawWaker::new(std::ptr::null(), &RawWakerVTable::new(clone, noop, noop, noop))
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut fut = pin!(fut);
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(out) => out,
        Poll::Pending => unreachable!("stub futures resolve immediately"),
    }
}

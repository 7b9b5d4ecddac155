use super::*;

#[test]
fn error_region_keeps_text_across_warning_toggles() {
    let board = NotificationBoard::new();
    board.show_error("Failed to stop devices");
    board.hide_error();
    assert!(!board.snapshot().error_visible);

    board.show_warning();
    let notices = board.snapshot();
    assert!(notices.error_visible);
    assert_eq!(notices.error_text, "Failed to stop devices");

    board.hide_warning();
    assert!(!board.snapshot().error_visible);
}

#[test]
fn log_text_replaces_previous_line() {
    let board = NotificationBoard::new();
    board.log_text("first");
    board.log_text("second");
    assert_eq!(board.snapshot().log_line, "second");
}

#[test]
fn dismiss_without_runtime_hides_immediately() {
    let board = NotificationBoard::new();
    board.show_info("Connecting, please wait...");
    board.dismiss_info();
    assert!(!board.snapshot().info_visible);
}

#[tokio::test]
async fn dismiss_hides_info_after_delay() {
    let board = NotificationBoard::new();
    board.show_info("Connecting, please wait...");
    board.dismiss_info();
    assert!(board.snapshot().info_visible);

    tokio::time::sleep(INFO_HIDE_DELAY + Duration::from_millis(200)).await;
    let notices = board.snapshot();
    assert!(!notices.info_visible);
    assert_eq!(notices.info_text, "Connecting, please wait...");
}

#[tokio::test]
async fn stale_dismiss_does_not_hide_newer_info() {
    let board = NotificationBoard::new();
    board.show_info("first");
    board.dismiss_info();
    board.show_info("second");

    tokio::time::sleep(INFO_HIDE_DELAY + Duration::from_millis(200)).await;
    let notices = board.snapshot();
    assert!(notices.info_visible);
    assert_eq!(notices.info_text, "second");
}

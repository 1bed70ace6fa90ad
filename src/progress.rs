use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a request is in flight. Callers clear it with
/// `finish_and_clear` before printing the check's PASS/FAIL line.
pub fn request_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

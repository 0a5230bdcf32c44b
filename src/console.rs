//! Operator-facing console reporting.
//!
//! The pipeline talks to a human, not to log aggregation: plain prefixed
//! lines on stdout, errors on stderr, no structured output.

/// Progress notice.
pub fn status(message: &str) {
    println!("[INFO] {message}");
}

/// Something the operator should act on, but not a failure.
pub fn warn(message: &str) {
    println!("[WARNING] {message}");
}

/// Failure notice.
pub fn error(message: &str) {
    eprintln!("[ERROR] {message}");
}

/// Section banner around a phase of work.
pub fn header(title: &str) {
    println!("================================");
    println!("{title}");
    println!("================================");
}

/// Banner used for content the operator needs to copy (e.g. a public key).
pub fn info_block(content: &str) {
    println!("================================");
    println!("{content}");
    println!("================================");
}

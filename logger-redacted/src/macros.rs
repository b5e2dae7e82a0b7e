// Logging macros that pass the formatted message through the default redactor
#[macro_export]
macro_rules! redacted_info {
    ($($arg:tt)*) => {
        $crate::tracing::info!("{}", $crate::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!("{}", $crate::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ($($arg:tt)*) => {
        $crate::tracing::error!("{}", $crate::redact(&format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_macros_log_through_reexported_tracing() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        crate::tracing::subscriber::with_default(subscriber, || {
            crate::redacted_warn!("retrying with Authorization: Bearer {}", "top-secret");
            crate::redacted_error!("giving up after {} attempts", 3);
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("giving up after 3 attempts"));
        assert!(!output.contains("top-secret"));
    }
}

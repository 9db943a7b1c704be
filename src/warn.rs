//! Printing warnings to stderr.

/// Print a "W: "-prefixed message with its source location. Never
/// fails; a broken stderr is silently ignored.
#[macro_export]
macro_rules! warn {
    ($fmt:expr $(, $arg:expr)*) => {{
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $fmt $(, $arg)*);
        let _ = writeln!(&mut outp, " at {}:{}", file!(), line!());
        let _ = outp.flush();
    }}
}

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Print `text` one word at a time, pausing `delay` after each word.
pub fn reveal_words(out: &mut impl Write, text: &str, delay: Duration) -> io::Result<()> {
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            out.write_all(b" ")?;
        }
        out.write_all(word.as_bytes())?;
        out.flush()?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    out.write_all(b"\n")?;
    out.flush()
}

//! Line-oriented terminal input.

use std::io::{self, BufRead, Write};

/// Print a prompt and read one line from stdin.
///
/// Returns `None` at end of input. The line terminator is stripped; all other
/// whitespace is kept so the text can be forwarded verbatim.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    read_line_from(&mut io::stdin().lock())
}

/// Read one line from any buffered reader.
pub fn read_line_from<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

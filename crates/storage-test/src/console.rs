use core::fmt::{self, Write};

/// Console adapter that ends every line with `\r\n`, for raw serial terminals
/// that don't return the carriage on a bare `\n`. Line breaks that already
/// carry a `\r`, even one written by an earlier call, pass through untouched.
#[derive(Debug)]
pub struct CrLf<W> {
    inner: W,
    after_cr: bool,
}

impl<W> CrLf<W> {
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            after_cr: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrLf<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if b != b'\n' {
                continue;
            }
            let has_cr = if i == 0 {
                self.after_cr
            } else {
                bytes[i - 1] == b'\r'
            };
            if !has_cr {
                // `i` is the index of an ASCII byte, so it's a char boundary.
                self.inner.write_str(&s[start..i])?;
                self.inner.write_str("\r")?;
                start = i;
            }
        }
        self.inner.write_str(&s[start..])?;

        if let Some(&last) = bytes.last() {
            self.after_cr = last == b'\r';
        }
        Ok(())
    }
}

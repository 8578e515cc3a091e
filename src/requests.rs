use std::fmt::Write;

use reqwest::header::AUTHORIZATION;

use crate::BatchResult;

/// Trait for converting a `reqwest::Request` to a HTTP string.
pub trait RequestToHttpString {
    /// Converts the `reqwest::Request` to a HTTP string.
    ///
    /// The value of the `authorization` header is masked.
    fn to_http_string(&self) -> BatchResult<String>;
}

impl RequestToHttpString for reqwest::Request {
    fn to_http_string(&self) -> BatchResult<String> {
        let mut result = String::new();

        write!(result, "{} {}", self.method(), self.url().path())?;
        if let Some(query) = self.url().query() {
            write!(result, "?{}", query)?;
        }
        writeln!(result, " HTTP/1.1")?;

        if let Some(host) = self.url().host_str() {
            if let Some(port) = self.url().port() {
                writeln!(result, "host: {}:{}", host, port)?;
            } else {
                writeln!(result, "host: {}", host)?;
            }
        }

        for (name, value) in self.headers() {
            if name == AUTHORIZATION {
                writeln!(result, "{}: ***", name)?;
            } else {
                writeln!(result, "{}: {}", name, value.to_str()?)?;
            }
        }

        writeln!(result)?;

        if let Some(body) = self.body() {
            if let Some(bytes) = body.as_bytes() {
                result.push_str(&String::from_utf8_lossy(bytes));
            } else {
                result.push_str("[streaming body - cannot display]");
            }
        }

        Ok(result)
    }
}

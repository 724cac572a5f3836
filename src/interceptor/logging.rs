use log::Level;

use crate::interceptor::Interceptor;
use crate::request::Request;
use crate::response::Response;

/// Logs every call through the `log` facade: one line when the request leaves, one when the
/// response (or failure) comes back.
#[derive(Debug, Clone, Copy)]
pub struct LogInterceptor {
    level: Level,
}

impl LogInterceptor {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for LogInterceptor {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Interceptor for LogInterceptor {
    fn on_request(&self, req: &mut Request) {
        log::log!(self.level, "--> {} {} ({} bytes)", req.method, req.url, req.body.len());
    }

    fn on_response(&self, res: &mut Response) {
        if res.is_transport_error() {
            log::log!(self.level, "<-- failed after {:.3}s: {}", res.elapsed_time(), res.error_message);
        } else {
            log::log!(
                self.level,
                "<-- {} in {:.3}s ({} bytes)",
                res.status_code,
                res.elapsed_time(),
                res.body.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_leaves_values_untouched() {
        let log = LogInterceptor::default();

        let original = Request::post("http://localhost/").body("x");
        let mut req = original.clone();
        log.on_request(&mut req);
        assert_eq!(req, original);

        let mut res = Response::failed("Timeout was reached");
        log.on_response(&mut res);
        assert_eq!(res.error_message, "Timeout was reached");
    }
}

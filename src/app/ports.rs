// Network-side port. The pipeline only ever talks to the remote source
// through this trait, which keeps every stage testable offline.
pub trait HttpClientPort {
    fn get(&self, url: &str) -> Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the body is declared as JSON. A response with no content
    /// type is given the benefit of the doubt.
    pub fn is_json(&self) -> bool {
        self.content_type.is_empty() || self.content_type.to_ascii_lowercase().contains("json")
    }
}

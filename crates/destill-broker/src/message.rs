/// One message as it travels through the broker. `value` is opaque bytes —
/// it is up to callers to agree on an encoding (this workspace always uses
/// UTF-8 JSON, per §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
    pub offset: Option<u64>,
    pub partition: Option<i32>,
    pub timestamp: Option<i64>,
}

impl Message {
    pub fn new(topic: impl Into<String>, key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key: key.into(),
            value,
            offset: None,
            partition: None,
            timestamp: None,
        }
    }
}

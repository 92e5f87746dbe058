use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Confirmation body returned by mutating endpoints, e.g. `{"message": "Item deleted"}`.
#[derive(Serialize, Debug)]
pub struct Message<'a> {
    pub message: &'a str,
}

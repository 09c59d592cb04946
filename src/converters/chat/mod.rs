pub mod chat_content;
pub mod chat_content_part;
pub mod chat_image_source;
pub mod chat_request;
pub mod chat_role;
pub mod chat_turn;

pub use chat_content::ChatContent;
pub use chat_content_part::ChatContentPart;
pub use chat_image_source::ChatImageSource;
pub use chat_request::ChatRequest;
pub use chat_role::ChatRole;
pub use chat_turn::ChatTurn;

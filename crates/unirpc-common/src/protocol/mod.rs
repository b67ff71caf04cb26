pub mod endpoint;
pub mod error;
pub mod messages;
pub mod requests;
pub mod responses;


pub use endpoint::Endpoint;
pub use error::{Result, RpcError};
pub use messages::{WelcomeRequest, WelcomeResponse};
pub use requests::{MethodName, Payload, Request, RequestId, SEND_WELCOME};
pub use responses::{Response, Status, StatusCode};

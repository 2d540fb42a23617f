//! Inbound adapters: bus handlers and the gRPC read API.

pub mod bus;
pub mod grpc;

pub use bus::{ForgetPasswordHandler, TicketDeletedHandler, TicketUpdatedHandler, VerifyEmailHandler};
pub use grpc::EmailsGrpcService;

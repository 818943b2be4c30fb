pub mod user_dto;

pub use user_dto::{
    CreateUserRequest,
    ForgotPasswordRequest,
    LoginRequest,
    ResetPasswordRequest,
    UpdateUserRequest,
    UserResponse,
};

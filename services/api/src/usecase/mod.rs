pub mod authenticate;
pub mod otp;
pub mod register;
pub mod social;
pub mod token;

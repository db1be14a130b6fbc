mod delete_user;
mod login;
mod logout;
mod register;

pub use delete_user::DeleteUserAction;
pub use login::LoginAction;
pub use logout::LogoutAction;
pub use register::RegisterAction;

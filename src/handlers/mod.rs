pub(crate) mod auth;
pub(crate) mod clients;
pub(crate) mod excel;
pub(crate) mod signup;
pub(crate) mod users;

use dropgate_core::prelude::*;

#[derive(Clone)]
pub struct AllowAllAuth;

impl AdminAuth for AllowAllAuth {
    async fn verify(&self, _token: &str) -> Result<AdminUser, AuthError> {
        Ok(AdminUser {
            id: "dev_admin".to_string(),
        })
    }
}

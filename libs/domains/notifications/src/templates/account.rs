use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::{ForgetPasswordContentBuilder, VerifyEmailContentBuilder, url_base};
use crate::error::NotificationResult;
use crate::models::User;

pub struct VerifyEmailTemplate {
    url_base: String,
}

impl VerifyEmailTemplate {
    pub fn new(base: &str) -> NotificationResult<Self> {
        Ok(Self {
            url_base: url_base(base)?,
        })
    }
}

impl VerifyEmailContentBuilder for VerifyEmailTemplate {
    fn subject(&self) -> String {
        "Подтверждение адреса электронной почты".to_string()
    }

    fn body(&self, user: &User) -> String {
        // The link carries the decimal id, base64url without padding
        let token = URL_SAFE_NO_PAD.encode(user.id.to_string());
        format!(
            "<p>Добрый день, {name}!</p>\n\
             <p>Пожалуйста, перейдите по <a href=\"{base}/{token}\">ссылке</a>, чтобы подтвердить адрес электронной почты!</p>\n\
             <p>С уважением,<br>\n\
             команда Handmade Toys Marketplace.</p>\n",
            name = user.display_name,
            base = self.url_base,
            token = token,
        )
    }
}

pub struct ForgetPasswordTemplate {
    url_base: String,
}

impl ForgetPasswordTemplate {
    pub fn new(base: &str) -> NotificationResult<Self> {
        Ok(Self {
            url_base: url_base(base)?,
        })
    }
}

impl ForgetPasswordContentBuilder for ForgetPasswordTemplate {
    fn subject(&self) -> String {
        "Восстановление пароля от аккаунта".to_string()
    }

    fn body(&self, user: &User, new_password: &str) -> String {
        format!(
            "<p>Добрый день, {name}!</p>\n\
             <p>Ваш новый пароль: <b><i>{new_password}</i></b>.</p>\n\
             <p>Пожалуйста, перейдите по <a href=\"{base}\">ссылке</a>, чтобы сменить пароль!</p>\n\
             <p>С уважением,<br>\n\
             команда Handmade Toys Marketplace.</p>\n",
            name = user.display_name,
            new_password = new_password,
            base = self.url_base,
        )
    }
}

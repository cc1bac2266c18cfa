use regex::Regex;

/// Field validation rules shared by the registration and update flows.
/// Mirrors the constraints enforced on the persisted profile rows: mandatory
/// names, email format, 10-digit phone numbers, bounded age, and password
/// complexity.
pub struct ProfileValidator {
    email_re: Regex,
    phone_re: Regex,
    uppercase_re: Regex,
    lowercase_re: Regex,
    digit_re: Regex,
    special_re: Regex,
    whitespace_re: Regex,
}

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 125;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 64;

impl ProfileValidator {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap(),
            phone_re: Regex::new(r"^\d{10}$").unwrap(),
            uppercase_re: Regex::new(r"[A-Z]").unwrap(),
            lowercase_re: Regex::new(r"[a-z]").unwrap(),
            digit_re: Regex::new(r"\d").unwrap(),
            special_re: Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap(),
            whitespace_re: Regex::new(r"\s").unwrap(),
        }
    }

    pub fn require(&self, field: &str, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(format!("{} is mandatory", field));
        }
        Ok(())
    }

    pub fn email(&self, email: &str) -> Result<(), String> {
        if !self.email_re.is_match(email) || email.len() > 254 {
            return Err("Incorrect email format".to_string());
        }
        Ok(())
    }

    pub fn phone(&self, phone: &str) -> Result<(), String> {
        if !self.phone_re.is_match(phone) {
            return Err("Phone number must be exactly 10 digits".to_string());
        }
        Ok(())
    }

    pub fn age(&self, age: i32) -> Result<(), String> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
        }
        Ok(())
    }

    pub fn password(&self, password: &str) -> Result<(), String> {
        if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
            return Err(format!(
                "Password must be between {} and {} characters long",
                MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
            ));
        }
        if !self.uppercase_re.is_match(password) {
            return Err("Password must contain at least one uppercase letter".to_string());
        }
        if !self.lowercase_re.is_match(password) {
            return Err("Password must contain at least one lowercase letter".to_string());
        }
        if !self.digit_re.is_match(password) {
            return Err("Password must contain at least one digit".to_string());
        }
        if !self.special_re.is_match(password) {
            return Err("Password must contain at least one special character".to_string());
        }
        if self.whitespace_re.is_match(password) {
            return Err("Password cannot contain spaces".to_string());
        }
        Ok(())
    }
}

impl Default for ProfileValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold individual field checks into a single result, keeping every message.
pub fn collect_issues(checks: Vec<Result<(), String>>) -> Result<(), String> {
    let issues: Vec<String> = checks.into_iter().filter_map(|c| c.err()).collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues.join("; "))
    }
}

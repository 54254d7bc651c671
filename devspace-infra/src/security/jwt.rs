use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub iss: String, // issuer
}

impl Claims {
    pub fn new(user_id: u64, issuer: String, expiration_seconds: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;

        Self {
            sub: user_id.to_string(),
            exp: now + expiration_seconds as usize,
            iat: now,
            iss: issuer,
        }
    }

    /// 从subject中解析用户ID
    pub fn user_id(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        self.sub
            .parse::<u64>()
            .map_err(|e| format!("invalid subject '{}': {}", self.sub, e).into())
    }
}

/// JWT服务，HS256签名
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration: u64,
}

impl JwtService {
    /// 创建新的JWT服务
    pub fn new(secret: &str, issuer: String, expiration: u64) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if secret.is_empty() {
            return Err("JWT secret must not be empty".into());
        }
        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        let decoding_key = DecodingKey::from_secret(secret.as_ref());

        Ok(Self {
            encoding_key,
            decoding_key,
            issuer,
            expiration,
        })
    }

    /// 为用户生成JWT令牌
    pub fn generate(&self, user_id: u64) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let claims = Claims::new(user_id, self.issuer.clone(), self.expiration);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| format!("JWT encode error: {}", e))?;
        Ok(token)
    }

    /// 验证JWT令牌
    pub fn verify(&self, token: &str) -> Result<Claims, Box<dyn std::error::Error + Send + Sync>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| format!("JWT decode error: {}", e))?;

        Ok(token_data.claims)
    }

    /// 获取过期时间（秒）
    pub fn expiration(&self) -> u64 {
        self.expiration
    }
}

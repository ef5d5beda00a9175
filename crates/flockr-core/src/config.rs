use argon2::{Algorithm, Argon2, Params, Version};

/// Runtime configuration for the domain layer. The server binary fills this
/// from the environment; tests build it directly.
#[derive(Debug, Clone)]
pub struct FlockrConfig {
    /// HMAC secret for the session token envelope.
    pub jwt_secret: String,
    /// Lifetime of a signed session token.
    pub session_ttl: chrono::Duration,
    pub hashing: HashingCost,
}

impl Default for FlockrConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".into(),
            session_ttl: chrono::Duration::days(30),
            hashing: HashingCost::default(),
        }
    }
}

/// Argon2id cost parameters used when hashing new passwords. Existing hashes
/// carry their own parameters, so changing these never locks anyone out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashingCost {
    /// Smallest cost Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    pub(crate) fn hasher(&self) -> anyhow::Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid Argon2 parameters: {}", e))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

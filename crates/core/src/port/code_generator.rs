// Redemption Code Provider Port (for deterministic testing)

use crate::domain::RedemptionCode;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Redemption code source (allows deterministic codes in tests)
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> RedemptionCode;
}

/// Random `[A-Za-z0-9]{6}` codes (production)
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> RedemptionCode {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RedemptionCode::LENGTH)
            .map(char::from)
            .collect();
        RedemptionCode::new(code)
    }
}

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out scripted codes, then falls back to random ones
    pub struct SequenceCodeGenerator {
        codes: Mutex<VecDeque<String>>,
    }

    impl SequenceCodeGenerator {
        pub fn new<I, S>(codes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
            }
        }
    }

    impl CodeGenerator for SequenceCodeGenerator {
        fn generate(&self) -> RedemptionCode {
            match self.codes.lock().unwrap().pop_front() {
                Some(code) => RedemptionCode::new(code),
                None => RandomCodeGenerator.generate(),
            }
        }
    }
}

pub mod loader;
pub mod models;
pub mod schema;

use std::path::PathBuf;

/// 환경 변수 접근을 추상화하는 트레이트 (테스트 격리를 위해 사용)
pub trait Env: Send + Sync {
    fn var(&self, key: &str) -> Result<String, std::env::VarError>;
}

/// 실제 환경 변수를 사용하는 구현체
pub struct RealEnv;

impl Env for RealEnv {
    fn var(&self, key: &str) -> Result<String, std::env::VarError> {
        std::env::var(key)
    }
}

/// ~/.stalebot 경로 반환
pub fn stalebot_home(env: &dyn Env) -> PathBuf {
    let home = env.var("STALEBOT_HOME").unwrap_or_else(|_| {
        let home = env.var("HOME").expect("HOME not set");
        format!("{home}/.stalebot")
    });
    PathBuf::from(home)
}

/// watch 모드 로그 디렉토리
pub fn log_dir(env: &dyn Env) -> PathBuf {
    stalebot_home(env).join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TestEnv {
        vars: HashMap<String, String>,
    }

    impl Env for TestEnv {
        fn var(&self, key: &str) -> Result<String, std::env::VarError> {
            self.vars
                .get(key)
                .cloned()
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn home_prefers_stalebot_home() {
        let env = TestEnv {
            vars: HashMap::from([("STALEBOT_HOME".to_string(), "/custom".to_string())]),
        };
        assert_eq!(stalebot_home(&env), PathBuf::from("/custom"));
    }

    #[test]
    fn home_falls_back_to_dot_dir() {
        let env = TestEnv {
            vars: HashMap::from([("HOME".to_string(), "/home/u".to_string())]),
        };
        assert_eq!(stalebot_home(&env), PathBuf::from("/home/u/.stalebot"));
    }
}

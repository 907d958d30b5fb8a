use crate::pb::HealthRes;

/// Liveness answer shared by the gRPC `Health` rpc and `GET /health`.
#[derive(Clone, Copy, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as up, naming the running API version.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: format!("Casedesk {} is alive", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_names_version() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(res.message.starts_with("Casedesk "));
        assert!(res.message.contains(env!("CARGO_PKG_VERSION")));
    }
}

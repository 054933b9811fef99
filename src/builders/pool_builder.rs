//! Construct worker pools from executor configuration.

use std::collections::HashMap;

use crate::config::{ExecutorConfig, PoolConfig};
use crate::core::{Pool, PoolError, Transform};

/// Build one pool per configured entry using the provided transform factory.
///
/// The factory is called once per pool with its name and configuration,
/// letting callers pick a different transform per pool (or fail pool
/// construction entirely).
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfig`] if the root configuration or any
/// pool entry fails validation, or whatever error the factory reports.
pub fn build_pools<T, U, F, FF>(
    cfg: &ExecutorConfig,
    mut transform_factory: FF,
) -> Result<HashMap<String, Pool<T, U>>, PoolError>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Transform<T, U>,
    FF: FnMut(&str, &PoolConfig) -> Result<F, PoolError>,
{
    cfg.validate().map_err(PoolError::InvalidConfig)?;

    let mut pools = HashMap::new();
    for (name, pool_cfg) in &cfg.pools {
        let transform = transform_factory(name, pool_cfg)?;
        let pool = Pool::new(pool_cfg.clone(), transform)?;
        pools.insert(name.clone(), pool);
    }

    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Task, TaskError};

    #[test]
    fn builds_all_configured_pools() {
        let cfg = ExecutorConfig::from_json_str(
            r#"{
                "pools": {
                    "fast": { "worker_count": 1 },
                    "wide": { "worker_count": 4 }
                }
            }"#,
        )
        .map_err(PoolError::InvalidConfig)
        .unwrap();

        let pools = build_pools(&cfg, |_name, _cfg| {
            Ok(|task: &Task<u32>| -> Result<u32, TaskError> { Ok(task.payload + 1) })
        })
        .unwrap();

        assert_eq!(pools.len(), 2);
        assert_eq!(pools["fast"].worker_count(), 1);
        assert_eq!(pools["wide"].worker_count(), 4);

        for pool in pools.values() {
            pool.close_submission();
        }
    }

    #[test]
    fn factory_error_aborts_build() {
        let cfg = ExecutorConfig::from_json_str(
            r#"{ "pools": { "only": { "worker_count": 1 } } }"#,
        )
        .map_err(PoolError::InvalidConfig)
        .unwrap();

        let result: Result<HashMap<String, Pool<u32, u32>>, PoolError> =
            build_pools(&cfg, |name, _cfg| {
                Err::<fn(&Task<u32>) -> Result<u32, TaskError>, _>(PoolError::InvalidConfig(
                    format!("no transform registered for `{name}`"),
                ))
            });
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }
}

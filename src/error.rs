pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pool is stopped")]
    PoolStopped,

    #[error("unknown worker: {0}")]
    UnknownWorker(String),

    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("executor error: {0}")]
    Executor(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }

    pub fn unknown_worker<S: Into<String>>(name: S) -> Self {
        Error::UnknownWorker(name.into())
    }

    pub fn task_failed<S: Into<String>>(msg: S) -> Self {
        Error::TaskFailed(msg.into())
    }
}

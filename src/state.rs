use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::mail::{LogMailer, Mailer};
use crate::todos::repo::{PgTodoStore, TodoStore};
use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let todos = Arc::new(PgTodoStore::new(pool)) as Arc<dyn TodoStore>;
        let mailer = Arc::new(LogMailer::new(config.mail.from.clone())) as Arc<dyn Mailer>;

        Ok(Self::from_parts(config, users, todos, mailer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            users,
            todos,
            mailer,
        }
    }
}

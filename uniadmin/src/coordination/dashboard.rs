use super::app::App;
use super::context::RequestContext;
use super::outcome::{ActionResult, DashboardStats, Outcome, Page, View};
use crate::authz::require_authenticated;
use crate::university::UniversityStore;
use crate::userdb::{Role, UserStore};

const RECENT_UNIVERSITIES: i64 = 5;

pub(super) async fn index(app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let store = app.data_store();
    let stats = DashboardStats {
        total_users: UserStore::count_users(store, None).await?,
        total_universities: UniversityStore::count(store, None).await?,
        admin_count: UserStore::count_users(store, Some(Role::Admin)).await?,
        user_count: UserStore::count_users(store, Some(Role::User)).await?,
    };
    let recent = UniversityStore::list(store, Some(RECENT_UNIVERSITIES), 0, None).await?;

    Ok(Outcome::Render(View::new(
        "Dashboard",
        Page::Dashboard {
            stats,
            recent,
            login_time: ctx.session.login_time(),
        },
    )))
}

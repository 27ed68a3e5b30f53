use super::PageContext;
use crate::services::PageScope;

pub struct LoginPage {
    ctx: PageContext,
    scope: PageScope,
    just_logged_out: bool,
}

impl LoginPage {
    pub fn new(ctx: PageContext, just_logged_out: bool) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            just_logged_out,
        }
    }

    /// Sends an already-authenticated visitor home. Returns whether it did.
    pub async fn mount(&self) -> bool {
        self.ctx
            .guard()
            .redirect_if_logged_in(&self.scope, self.ctx.navigator())
            .await
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    /// OAuth has to happen in the browser, so the page only hands out the URL.
    pub fn login_url(&self) -> String {
        self.ctx.client.url("/auth/google/login")
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.just_logged_out.then_some("You have been logged out.")
    }
}

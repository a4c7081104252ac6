use crate::{components::layout::LoadingSpinner, session::SessionState, state::session::use_session};
use leptos::*;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    RedirectToLogin,
    RedirectToDashboard,
    Render,
}

impl GuardDecision {
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToDashboard => Some(DASHBOARD_PATH),
            GuardDecision::Loading | GuardDecision::Render => None,
        }
    }
}

pub fn guard_decision(state: &SessionState) -> GuardDecision {
    if state.loading {
        GuardDecision::Loading
    } else if state.identity.is_none() {
        GuardDecision::RedirectToLogin
    } else {
        GuardDecision::Render
    }
}

/// Admin views additionally need an explicit admin role claim.
pub fn admin_guard_decision(state: &SessionState) -> GuardDecision {
    match guard_decision(state) {
        GuardDecision::Render if !state.role.is_admin() => GuardDecision::RedirectToDashboard,
        decision => decision,
    }
}

#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    guarded(guard_decision, children)
}

#[component]
pub fn RequireAdmin(children: ChildrenFn) -> impl IntoView {
    guarded(admin_guard_decision, children)
}

fn guarded(decide: fn(&SessionState) -> GuardDecision, children: ChildrenFn) -> impl IntoView {
    let (session, _) = use_session();
    let decision = create_memo(move |_| session.with(decide));
    create_effect(move |_| {
        if let Some(target) = decision.get().redirect_target() {
            redirect(target);
        }
    });
    view! {
        <Show
            when=move || decision.get() == GuardDecision::Render
            fallback=move || {
                if decision.get() == GuardDecision::Loading {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

#[cfg(target_arch = "wasm32")]
fn redirect(target: &str) {
    if let Some(win) = web_sys::window() {
        if let Err(err) = win.location().set_href(target) {
            log::warn!("Redirect to {} failed: {:?}", target, err);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn redirect(target: &str) {
    log::debug!("Skipping redirect to {} outside the browser", target);
}

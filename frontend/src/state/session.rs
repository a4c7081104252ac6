use crate::{
    api::{ApiClient, LoginRequest, RegisterRequest},
    config,
    session::{SessionError, SessionManager, SessionState},
};
use leptos::*;

pub type SessionContext = (ReadSignal<SessionState>, WriteSignal<SessionState>);

/// Runs the one-time restore and publishes the manager, its `ApiClient` and
/// the state signals to descendants.
pub fn provide_session(manager: SessionManager) -> SessionContext {
    let (state, set_state) = create_signal(SessionState::default());
    set_state.set(manager.restore());

    provide_context(manager.api().clone());
    provide_context(manager);
    let ctx = (state, set_state);
    provide_context::<SessionContext>(ctx);
    ctx
}

#[component]
pub fn SessionProvider(
    #[prop(optional)] manager: Option<SessionManager>,
    children: Children,
) -> impl IntoView {
    let manager =
        manager.unwrap_or_else(|| SessionManager::from_config(config::client_config()));
    provide_session(manager);
    view! { <>{children()}</> }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().unwrap_or_else(|| create_signal(SessionState::default()))
}

pub fn use_session_manager() -> SessionManager {
    use_context::<SessionManager>()
        .unwrap_or_else(|| SessionManager::from_config(config::client_config()))
}

pub fn use_api_client() -> ApiClient {
    use_context::<ApiClient>().unwrap_or_else(|| use_session_manager().api().clone())
}

pub async fn login_request(
    manager: &SessionManager,
    request: &LoginRequest,
    set_state: WriteSignal<SessionState>,
) -> Result<(), SessionError> {
    let result = manager.login(&request.username, &request.password).await;
    if result.is_ok() {
        set_state.set(manager.state());
    }
    result
}

pub fn logout(manager: &SessionManager, set_state: WriteSignal<SessionState>) {
    manager.logout();
    set_state.set(manager.state());
}

/// Registration never changes the session; the form navigates to login.
pub async fn register_request(
    manager: &SessionManager,
    profile: &RegisterRequest,
) -> Result<(), SessionError> {
    manager.register(profile).await
}

/// Drops the dispatch while the same action is still in flight, so a
/// double-clicked submit issues a single request.
pub fn dispatch_unless_pending<I: 'static, O: 'static>(action: Action<I, O>, input: I) -> bool {
    if action.pending().get_untracked() {
        log::debug!("Ignoring dispatch while a submission is pending");
        return false;
    }
    action.dispatch(input);
    true
}

/// Form submission action. The only way to dispatch it is
/// [`SubmitAction::dispatch`], which ignores submits while one is pending.
pub struct SubmitAction<I: 'static, O: 'static> {
    action: Action<I, O>,
}

impl<I: 'static, O: 'static> Clone for SubmitAction<I, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: 'static, O: 'static> Copy for SubmitAction<I, O> {}

impl<I: 'static, O: 'static> SubmitAction<I, O> {
    fn new(action: Action<I, O>) -> Self {
        Self { action }
    }

    /// Returns false when the submit was dropped.
    pub fn dispatch(&self, input: I) -> bool {
        dispatch_unless_pending(self.action, input)
    }

    pub fn pending(&self) -> ReadSignal<bool> {
        self.action.pending()
    }

    pub fn value(&self) -> RwSignal<Option<O>> {
        self.action.value()
    }
}

pub fn use_login_action() -> SubmitAction<LoginRequest, Result<(), SessionError>> {
    let (_state, set_state) = use_session();
    let manager = use_session_manager();

    SubmitAction::new(create_action(move |request: &LoginRequest| {
        let request = request.clone();
        let manager = manager.clone();
        async move { login_request(&manager, &request, set_state).await }
    }))
}

pub fn use_register_action() -> SubmitAction<RegisterRequest, Result<(), SessionError>> {
    let manager = use_session_manager();

    SubmitAction::new(create_action(move |profile: &RegisterRequest| {
        let profile = profile.clone();
        let manager = manager.clone();
        async move { register_request(&manager, &profile).await }
    }))
}

pub fn use_logout_action() -> SubmitAction<(), ()> {
    let (_state, set_state) = use_session();
    let manager = use_session_manager();

    SubmitAction::new(create_action(move |_: &()| {
        logout(&manager, set_state);
        async {}
    }))
}

use folio_client::api::NewUser;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct RegisterProps {
    pub host: String,
    pub error: Option<String>,
    pub on_submit: Callback<(String, NewUser)>,
}

pub struct Register {
    host: String,
    user: String,
    email: String,
    pass: String,
    confirm: String,
    form_error: Option<String>,
}

pub enum RegisterMsg {
    HostChanged(String),
    UserChanged(String),
    EmailChanged(String),
    PassChanged(String),
    ConfirmChanged(String),
    SubmitClicked,
}

impl Register {
    /// The account to create, if the form is filled in correctly
    fn new_user(&self) -> Result<NewUser, String> {
        let user = NewUser {
            username: self.user.trim().to_string(),
            password: self.pass.clone(),
            email: self.email.trim().to_string(),
        };
        user.validate_confirmed(&self.confirm)
            .map_err(|e| e.to_string())?;
        Ok(user)
    }
}

impl Component for Register {
    type Message = RegisterMsg;
    type Properties = RegisterProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            host: ctx.props().host.clone(),
            user: String::new(),
            email: String::new(),
            pass: String::new(),
            confirm: String::new(),
            form_error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RegisterMsg::HostChanged(h) => self.host = h,
            RegisterMsg::UserChanged(u) => self.user = u,
            RegisterMsg::EmailChanged(e) => self.email = e,
            RegisterMsg::PassChanged(p) => self.pass = p,
            RegisterMsg::ConfirmChanged(c) => self.confirm = c,
            RegisterMsg::SubmitClicked => match self.new_user() {
                Ok(user) => {
                    self.form_error = None;
                    ctx.props().on_submit.emit((self.host.clone(), user));
                }
                Err(e) => self.form_error = Some(e),
            },
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    RegisterMsg::$msg(input.value())
                })
            };
        }
        let error = self.form_error.as_ref().or(ctx.props().error.as_ref());
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Sign up" }</h1>
            </div>
            { for error.map(|e| html! {
                <div class="alert alert-danger" role="alert">{ e }</div>
            }) }
            <form class="login-form" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                RegisterMsg::SubmitClicked
            })}>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="host">{ "Host" }</label>
                    <input
                        type="url"
                        class="form-control form-control-lg"
                        id="host"
                        value={self.host.clone()}
                        onchange={callback_for!(HostChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="user">{ "Username" }</label>
                    <input
                        type="text"
                        class="form-control form-control-lg"
                        id="user"
                        value={self.user.clone()}
                        onchange={callback_for!(UserChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        placeholder="optional"
                        value={self.email.clone()}
                        onchange={callback_for!(EmailChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="pass">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="pass"
                        value={self.pass.clone()}
                        onchange={callback_for!(PassChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="confirm">{ "Confirm" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="confirm"
                        value={self.confirm.clone()}
                        onchange={callback_for!(ConfirmChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary">
                    { "Create account" }
                </button>
            </form>
        </>}
    }
}

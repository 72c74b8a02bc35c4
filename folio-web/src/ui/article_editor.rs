use std::{ops::Range, time::Duration};

use folio_client::{
    api::{Error, Post, PostId, CATEGORIES},
    char_to_utf16_offset, perform_save,
    schedule::{cancellable, run_every, Canceller},
    utf16_to_char_offset, ArticleEditor, AutosaveInterval, BlogApi, EditorConfig, Format,
    Reconciled, SaveOutcome, SaveRequest, Shortcut,
};
use yew::prelude::*;

use crate::{storage::BrowserStore, ui, util, Backend};

/// How often pending typing and autosave deadlines are checked
const TICK: Duration = Duration::from_millis(250);

#[derive(Clone, PartialEq, Properties)]
pub struct ArticleEditorProps {
    pub post: Option<PostId>,
    pub backend: Backend,
    pub config: EditorConfig,
    pub on_config: Callback<EditorConfig>,
    pub on_saved: Callback<PostId>,
}

pub enum ArticleEditorMsg {
    Loaded(Result<Option<Post>, Error>),
    Tick,
    TitleChanged(String),
    CategoryChanged(String),
    TagsChanged(String),
    CoverChanged(String),
    ContentInput(String),
    FormatClicked(Format),
    Shortcut(Shortcut),
    TogglePreview,
    IntervalChanged(String),
    CoverFileChosen(web_sys::File),
    CoverUploaded(Result<String, Error>),
    SaveClicked { publish: bool },
    Saved(SaveRequest, SaveOutcome),
    DismissNotice,
}

pub struct ArticleEditorView {
    editor: Option<ArticleEditor<BrowserStore>>,
    load_error: Option<String>,
    form_error: Option<String>,
    textarea: NodeRef,
    /// Selection to restore once the new content is rendered, in characters
    pending_selection: Option<Range<usize>>,
    _ticker: Canceller,
}

/// Current selection of `area`, in characters of `content`
fn selection(area: &NodeRef, content: &str) -> Range<usize> {
    let end = content.chars().count();
    let Some(area) = area.cast::<web_sys::HtmlTextAreaElement>() else {
        return end..end;
    };
    let start = area.selection_start().ok().flatten();
    let stop = area.selection_end().ok().flatten();
    match (start, stop) {
        (Some(s), Some(e)) => {
            utf16_to_char_offset(content, s as usize)..utf16_to_char_offset(content, e as usize)
        }
        _ => end..end,
    }
}

impl Component for ArticleEditorView {
    type Message = ArticleEditorMsg;
    type Properties = ArticleEditorProps;

    fn create(ctx: &Context<Self>) -> Self {
        let api = ctx.props().backend.api();
        let post = ctx.props().post;
        ctx.link().send_future(async move {
            ArticleEditorMsg::Loaded(match post {
                Some(id) => api.get_post(id).await.map(Some),
                None => Ok(None),
            })
        });

        let (canceller, cancellation) = cancellable();
        let link = ctx.link().clone();
        wasm_bindgen_futures::spawn_local(run_every(TICK, util::sleep, cancellation, move || {
            link.send_message(ArticleEditorMsg::Tick)
        }));

        Self {
            editor: None,
            load_error: None,
            form_error: None,
            textarea: NodeRef::default(),
            pending_selection: None,
            _ticker: canceller,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        if let ArticleEditorMsg::Loaded(res) = msg {
            match res {
                Ok(post) => {
                    let editor = ArticleEditor::mount(
                        BrowserStore,
                        post.as_ref(),
                        &ctx.props().config,
                        util::now(),
                    );
                    if let Reconciled::Restored { saved_at } = editor.reconciled() {
                        tracing::info!(%saved_at, "restored local draft");
                    }
                    self.editor = Some(editor);
                }
                Err(e) => {
                    tracing::error!(error = ?e, "failed to load article");
                    self.load_error = Some(e.user_message("Failed to load article"));
                }
            }
            return true;
        }
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let api = ctx.props().backend.api();
        match msg {
            // handled above
            ArticleEditorMsg::Loaded(_) => return false,
            ArticleEditorMsg::Tick => {
                let before = editor.last_autosaved_at();
                editor.tick(util::now());
                return editor.last_autosaved_at() != before;
            }
            ArticleEditorMsg::TitleChanged(t) => editor.set_title(t),
            ArticleEditorMsg::CategoryChanged(c) => editor.set_category(c),
            ArticleEditorMsg::TagsChanged(t) => editor.set_tags(t),
            ArticleEditorMsg::CoverChanged(c) => editor.set_cover(Some(c)),
            ArticleEditorMsg::ContentInput(c) => editor.input_content(c, util::now()),
            ArticleEditorMsg::FormatClicked(format) => {
                let selection = selection(&self.textarea, &editor.form().content);
                self.pending_selection = Some(editor.apply_format(format, selection));
            }
            ArticleEditorMsg::Shortcut(s) => return editor.shortcut(s),
            ArticleEditorMsg::TogglePreview => editor.toggle_preview(),
            ArticleEditorMsg::IntervalChanged(name) => {
                let Some(interval) = AutosaveInterval::from_name(&name) else {
                    return false;
                };
                editor.set_autosave_interval(interval, util::now());
                let mut config = ctx.props().config.clone();
                config.autosave_interval = interval;
                ctx.props().on_config.emit(config);
            }
            ArticleEditorMsg::CoverFileChosen(file) => {
                if editor.begin_upload().is_err() {
                    return false;
                }
                ctx.link().send_future(async move {
                    let name = file.name();
                    let res = match util::read_file(file).await {
                        Ok(bytes) => api.upload_cover(&name, bytes).await,
                        Err(e) => Err(Error::Unknown(format!("{e:#}"))),
                    };
                    ArticleEditorMsg::CoverUploaded(res)
                });
            }
            ArticleEditorMsg::CoverUploaded(res) => editor.finish_upload(res),
            ArticleEditorMsg::SaveClicked { publish } => match editor.begin_save(publish) {
                Ok(req) => {
                    self.form_error = None;
                    ctx.link().send_future(async move {
                        let outcome = perform_save(&api, &req).await;
                        ArticleEditorMsg::Saved(req, outcome)
                    });
                }
                Err(Error::Busy) => return false,
                Err(e) => self.form_error = Some(e.to_string()),
            },
            ArticleEditorMsg::Saved(req, outcome) => {
                if let Ok(post) = editor.finish_save(&req, outcome) {
                    if req.publish {
                        ctx.props().on_saved.emit(post.id);
                    }
                }
            }
            ArticleEditorMsg::DismissNotice => editor.dismiss_notice(),
        }
        true
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let (Some(selection), Some(editor)) = (self.pending_selection.take(), &self.editor) else {
            return;
        };
        let Some(area) = self.textarea.cast::<web_sys::HtmlTextAreaElement>() else {
            return;
        };
        let content = &editor.form().content;
        let start = char_to_utf16_offset(content, selection.start) as u32;
        let end = char_to_utf16_offset(content, selection.end) as u32;
        if let Err(e) = area.focus() {
            tracing::debug!(?e, "failed to focus editor");
        }
        if let Err(e) = area.set_selection_range(start, end) {
            tracing::debug!(?e, "failed to restore selection");
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let editor = match (&self.editor, &self.load_error) {
            (_, Some(e)) => return html! { <div class="alert alert-danger">{ e }</div> },
            (None, None) => {
                return html! { <div class="spinner-border" role="status"></div> };
            }
            (Some(editor), None) => editor,
        };
        let link = ctx.link();
        macro_rules! callback_for {
            ($msg:ident) => {
                link.callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    ArticleEditorMsg::$msg(input.value())
                })
            };
        }
        let form = editor.form();
        let busy = editor.is_saving();
        html! {
            <div class="article-editor">
                { for editor.notice().map(|n| html! {
                    <div class="alert alert-danger alert-dismissible" role="alert">
                        { n }
                        <button
                            type="button"
                            class="btn-close"
                            aria-label="Close"
                            onclick={ link.callback(|_| ArticleEditorMsg::DismissNotice) }
                        ></button>
                    </div>
                }) }
                { for self.form_error.as_ref().map(|e| html! {
                    <div class="alert alert-warning" role="alert">{ e }</div>
                }) }
                { for matches!(editor.reconciled(), Reconciled::Restored { .. }).then(|| html! {
                    <div class="alert alert-info">{ "Restored your unsaved local draft" }</div>
                }) }
                <input
                    type="text"
                    class="form-control form-control-lg mb-2"
                    placeholder="Title"
                    value={ form.title.clone() }
                    onchange={ callback_for!(TitleChanged) }
                />
                <div class="d-flex gap-2 mb-2">
                    <select
                        class="form-select"
                        onchange={ link.callback(|e: web_sys::Event| {
                            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                            ArticleEditorMsg::CategoryChanged(select.value())
                        }) }
                    >
                        { for CATEGORIES.iter().map(|c| html! {
                            <option value={ *c } selected={ form.category == *c }>{ *c }</option>
                        }) }
                    </select>
                    <input
                        type="text"
                        class="form-control"
                        placeholder="Tags, comma-separated"
                        value={ form.tags.clone() }
                        onchange={ callback_for!(TagsChanged) }
                    />
                </div>
                { self.cover_input(ctx, editor) }
                <ui::Toolbar
                    disabled={ editor.is_previewing() }
                    on_format={ link.callback(ArticleEditorMsg::FormatClicked) }
                />
                { match editor.is_previewing() {
                    true => self.preview(editor),
                    false => html! {
                        <textarea
                            ref={ self.textarea.clone() }
                            class="form-control editor-content"
                            rows="20"
                            value={ form.content.clone() }
                            oninput={ link.callback(|e: InputEvent| {
                                let area: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                                ArticleEditorMsg::ContentInput(area.value())
                            }) }
                            onkeydown={ link.batch_callback(|e: KeyboardEvent| {
                                let shortcut =
                                    Shortcut::from_key(&e.key(), e.ctrl_key() || e.meta_key(), e.shift_key());
                                if shortcut.is_some() {
                                    e.prevent_default();
                                }
                                shortcut.map(ArticleEditorMsg::Shortcut)
                            }) }
                        />
                    },
                } }
                <div class="editor-status d-flex align-items-center gap-3 my-2">
                    <small class="text-muted">{ format!("{} characters", editor.char_count()) }</small>
                    { for editor.last_autosaved_at().map(|t| html! {
                        <small class="text-muted">
                            { format!("Draft saved locally at {}", util::format_time(Some(t))) }
                        </small>
                    }) }
                    <label class="ms-auto">{ "Autosave" }</label>
                    <select
                        class="form-select form-select-sm w-auto"
                        onchange={ link.callback(|e: web_sys::Event| {
                            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                            ArticleEditorMsg::IntervalChanged(select.value())
                        }) }
                    >
                        { for AutosaveInterval::ALL.iter().map(|i| html! {
                            <option
                                value={ i.name() }
                                selected={ *i == ctx.props().config.autosave_interval }
                            >
                                { i.label() }
                            </option>
                        }) }
                    </select>
                </div>
                <div class="d-flex gap-2">
                    <button
                        type="button"
                        class="btn btn-outline-secondary"
                        onclick={ link.callback(|_| ArticleEditorMsg::TogglePreview) }
                    >
                        { if editor.is_previewing() { "Edit" } else { "Preview" } }
                    </button>
                    <button
                        type="button"
                        class="btn btn-secondary ms-auto"
                        disabled={ busy }
                        onclick={ link.callback(|_| ArticleEditorMsg::SaveClicked { publish: false }) }
                    >
                        { "Save draft" }
                    </button>
                    <button
                        type="button"
                        class="btn btn-primary"
                        disabled={ busy }
                        onclick={ link.callback(|_| ArticleEditorMsg::SaveClicked { publish: true }) }
                    >
                        { if busy { "Saving..." } else { "Publish" } }
                    </button>
                </div>
            </div>
        }
    }
}

impl ArticleEditorView {
    fn cover_input(&self, ctx: &Context<Self>, editor: &ArticleEditor<BrowserStore>) -> Html {
        let link = ctx.link();
        html! {
            <div class="cover-input d-flex align-items-center gap-2 mb-2">
                <input
                    type="text"
                    class="form-control"
                    placeholder="Cover image URL"
                    value={ editor.form().cover.clone().unwrap_or_default() }
                    onchange={ link.callback(|e: web_sys::Event| {
                        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                        ArticleEditorMsg::CoverChanged(input.value())
                    }) }
                />
                <input
                    type="file"
                    class="form-control w-auto"
                    accept="image/*"
                    disabled={ editor.is_uploading() }
                    onchange={ link.batch_callback(|e: web_sys::Event| {
                        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                        input
                            .files()
                            .and_then(|f| f.get(0))
                            .map(ArticleEditorMsg::CoverFileChosen)
                    }) }
                />
                { for editor.is_uploading().then(|| html! {
                    <div class="spinner-border spinner-border-sm" role="status"></div>
                }) }
                { for editor.form().cover.as_ref().map(|c| html! {
                    <img class="cover-preview" src={ c.clone() } alt="cover" />
                }) }
            </div>
        }
    }

    fn preview(&self, editor: &ArticleEditor<BrowserStore>) -> Html {
        let headings = editor.headings();
        html! {
            <div class="d-flex gap-3">
                { for (!headings.is_empty()).then(|| html! {
                    <nav class="toc">
                        <ul class="list-unstyled">
                            { for headings.iter().map(|h| html! {
                                <li class={ format!("toc-level-{}", h.level) }>
                                    <a href={ format!("#{}", h.id) }>{ &h.text }</a>
                                </li>
                            }) }
                        </ul>
                    </nav>
                }) }
                <div class="markdown-body flex-fill">
                    { Html::from_html_unchecked(editor.preview_html().into()) }
                </div>
            </div>
        }
    }
}

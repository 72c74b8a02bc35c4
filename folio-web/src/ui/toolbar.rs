use folio_client::Format;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ToolbarProps {
    pub disabled: bool,
    pub on_format: Callback<Format>,
}

#[function_component(Toolbar)]
pub fn toolbar(p: &ToolbarProps) -> Html {
    html! {
        <div class="btn-toolbar editor-toolbar mb-2" role="toolbar">
            <div class="btn-group btn-group-sm flex-wrap">
                { for Format::ALL.iter().map(|&f| html! {
                    <button
                        type="button"
                        class="btn btn-outline-secondary"
                        title={ f.title() }
                        disabled={ p.disabled }
                        onclick={ p.on_format.reform(move |_| f) }
                    >
                        { f.label() }
                    </button>
                }) }
            </div>
        </div>
    }
}

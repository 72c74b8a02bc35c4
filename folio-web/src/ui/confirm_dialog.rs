use folio_client::ConfirmDialog;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ConfirmDialogProps<T: Clone + PartialEq> {
    pub dialog: ConfirmDialog<T>,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(ConfirmDialogView)]
pub fn confirm_dialog<T: Clone + PartialEq + 'static>(p: &ConfirmDialogProps<T>) -> Html {
    html! {
        <div class="modal d-block" tabindex="-1" role="dialog" aria-modal="true">
            <div class="modal-dialog modal-dialog-centered">
                <div class="modal-content">
                    <div class="modal-header">
                        <h5 class="modal-title">{ &p.dialog.title }</h5>
                    </div>
                    <div class="modal-body">
                        <p>{ &p.dialog.message }</p>
                    </div>
                    <div class="modal-footer">
                        <button
                            type="button"
                            class="btn btn-secondary"
                            onclick={ p.on_cancel.reform(|_| ()) }
                        >
                            { &p.dialog.cancel_label }
                        </button>
                        <button
                            type="button"
                            class="btn btn-danger"
                            onclick={ p.on_confirm.reform(|_| ()) }
                        >
                            { &p.dialog.confirm_label }
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}

use dioxus::prelude::*;

/// Modal overlay in the shape every edit dialog shares. Clicking the
/// backdrop closes it; the card swallows the click.
#[component]
pub fn ModalShell(title: String, on_close: EventHandler<()>, children: Element) -> Element {
    rsx! {
        div {
            style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: flex-start; justify-content: center; padding-top: 8vh; z-index: 1000;",
            onclick: move |_| on_close.call(()),
            div {
                style: "background: #fff; border-radius: 10px; min-width: 420px; max-width: 640px; max-height: 80vh; overflow-y: auto; padding: 20px; box-shadow: 0 10px 24px rgba(0,0,0,0.2);",
                onclick: move |event| event.stop_propagation(),
                div {
                    style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
                    h3 { style: "margin: 0;", "{title}" }
                    button {
                        style: "border: none; background: transparent; font-size: 16px; cursor: pointer;",
                        onclick: move |_| on_close.call(()),
                        "✕"
                    }
                }
                {children}
            }
        }
    }
}

/// Labelled text input with inline validation errors underneath.
#[component]
pub fn TextField(
    label: String,
    value: String,
    #[props(default = false)] required: bool,
    #[props(default)] errors: Vec<String>,
    on_input: EventHandler<String>,
) -> Element {
    let marker = if required { " *" } else { "" };
    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 4px; margin-bottom: 10px;",
            label { style: "font-size: 13px; font-weight: 600;", "{label}{marker}" }
            input {
                r#type: "text",
                value: "{value}",
                style: "border: 1px solid #ccc; border-radius: 6px; padding: 6px 8px;",
                oninput: move |event| on_input.call(event.value()),
            }
            {errors.iter().map(|error| rsx! {
                span {
                    key: "{error}",
                    style: "color: #c92a2a; font-size: 12px;",
                    "{error}"
                }
            })}
        }
    }
}

/// Red alert box aggregating error messages, shown above forms and the
/// reconciliation table.
#[component]
pub fn ErrorSummary(#[props(default = String::from("Errors"))] title: String, messages: Vec<String>) -> Element {
    if messages.is_empty() {
        return rsx! {};
    }
    rsx! {
        div {
            style: "border: 1px solid #ffa8a8; background: #fff5f5; border-radius: 8px; padding: 12px; margin-bottom: 12px;",
            strong { style: "color: #c92a2a; display: block; margin-bottom: 6px;", "{title}" }
            {messages.iter().map(|message| rsx! {
                p { key: "{message}", style: "margin: 2px 0; color: #862e2e; font-size: 13px;", "{message}" }
            })}
        }
    }
}

/// Green counterpart to [`ErrorSummary`].
#[component]
pub fn SuccessSummary(message: String) -> Element {
    rsx! {
        div {
            style: "border: 1px solid #8ce99a; background: #ebfbee; border-radius: 8px; padding: 12px; margin-bottom: 12px;",
            strong { style: "color: #2b8a3e;", "Success" }
            p { style: "margin: 4px 0 0; color: #2b8a3e; font-size: 13px;", "{message}" }
        }
    }
}

//! User Form Component
//!
//! Create/edit form for users. Validation runs through the declarative
//! schema before anything is sent; the first failing rule per field is
//! shown inline. Queue membership is edited with checkboxes.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos::task::spawn_local;

use form_schema::{Errors, Field, Schema};

use crate::api;
use crate::models::{Queue, UserPayload};
use crate::toast::use_toasts;

fn user_rules() -> Schema {
    Schema::new()
        .field(
            Field::new("name")
                .required("Name is required")
                .min(2, "Name is too short")
                .max(50, "Name is too long"),
        )
        .field(
            Field::new("password")
                .min(5, "Password is too short")
                .max(50, "Password is too long"),
        )
        .field(
            Field::new("email")
                .required("Email is required")
                .email("Invalid email"),
        )
}

/// User create/edit form. With a `user_id` the record is fetched and the
/// fields prefilled; without one, submit creates a new user.
#[component]
pub fn UserForm(
    #[prop(optional)] user_id: Option<u32>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let toasts = use_toasts();

    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (profile, set_profile) = signal(String::from("user"));
    let (queues, set_queues) = signal(Vec::<Queue>::new());
    let (queue_ids, set_queue_ids) = signal(Vec::<u32>::new());
    let errors = RwSignal::new(Errors::default());

    if let Some(id) = user_id {
        spawn_local(async move {
            match api::fetch_user(id).await {
                Ok(user) => {
                    set_name.set(user.name);
                    set_email.set(user.email);
                    set_profile.set(user.profile);
                    set_queue_ids.set(user.queues.iter().map(|q| q.id).collect());
                    set_queues.set(user.queues);
                }
                Err(e) => toasts.error(e.to_string()),
            }
        });
    }

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let mut values = HashMap::new();
        values.insert("name".to_string(), name.get());
        values.insert("email".to_string(), email.get());
        values.insert("password".to_string(), password.get());
        let found = user_rules().validate(&values);
        if !found.is_empty() {
            errors.set(found);
            return;
        }
        errors.set(Errors::default());

        let payload = UserPayload {
            name: name.get(),
            email: email.get(),
            password: password.get(),
            profile: profile.get(),
            queue_ids: queue_ids.get(),
        };
        spawn_local(async move {
            let saved = match user_id {
                Some(id) => api::update_user(id, &payload).await,
                None => api::create_user(&payload).await,
            };
            match saved {
                Ok(_) => {
                    toasts.success("User saved");
                    on_close.run(());
                }
                Err(e) => toasts.error(e.to_string()),
            }
        });
    };

    let field_error = move |field: &'static str| {
        move || errors.with(|e| e.get(field).map(str::to_string))
    };

    view! {
        <form class="user-form" on:submit=on_submit>
            <label class="form-field">
                "Name"
                <input
                    type="text"
                    prop:value=move || name.get()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <span class="field-error">{field_error("name")}</span>
            </label>
            <label class="form-field">
                "Email"
                <input
                    type="text"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <span class="field-error">{field_error("email")}</span>
            </label>
            <label class="form-field">
                "Password"
                <input
                    type="password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <span class="field-error">{field_error("password")}</span>
            </label>
            <label class="form-field">
                "Profile"
                <select
                    prop:value=move || profile.get()
                    on:change=move |ev| set_profile.set(event_target_value(&ev))
                >
                    <option value="user">"User"</option>
                    <option value="admin">"Admin"</option>
                </select>
            </label>
            <div class="queue-picks">
                <For
                    each=move || queues.get()
                    key=|q| q.id
                    children=move |queue| {
                        let qid = queue.id;
                        view! {
                            <label class="queue-pick">
                                <input
                                    type="checkbox"
                                    prop:checked=move || queue_ids.with(|ids| ids.contains(&qid))
                                    on:change=move |ev| {
                                        let on = event_target_checked(&ev);
                                        set_queue_ids
                                            .update(|ids| {
                                                if on {
                                                    if !ids.contains(&qid) {
                                                        ids.push(qid);
                                                    }
                                                } else {
                                                    ids.retain(|id| *id != qid);
                                                }
                                            });
                                    }
                                />
                                {queue.name.clone()}
                            </label>
                        }
                    }
                />
            </div>
            <div class="form-actions">
                <button type="button" on:click=move |_| on_close.run(())>
                    "Cancel"
                </button>
                <button type="submit">"Save"</button>
            </div>
        </form>
    }
}

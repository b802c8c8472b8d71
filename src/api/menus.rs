use super::client::{ApiClient, ApiError};
use crate::menu::tree::{MenuId, LOCAL_ID_RANGE};
use crate::menu::{MenuItem, MenuSavePayload};
use crate::session::Session;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// The store endpoint keeps the tree as opaque text, so depending on the
/// backend version `data` comes back as an array or as that text.
#[derive(Deserialize)]
struct MenuResponse {
    #[serde(default)]
    data: Value,
}

/// Decode `data` into a tree.
///
/// A tree saved in the clean shape has no ids; those nodes get fresh local
/// ids that do not collide with the ones present.
fn decode_tree(data: Value) -> Result<Vec<MenuItem>, serde_json::Error> {
    let mut tree = match data {
        Value::Null => return Ok(Vec::new()),
        Value::String(text) if text.trim().is_empty() => return Ok(Vec::new()),
        Value::String(text) => serde_json::from_str(&text)?,
        other => other,
    };

    let mut used = HashSet::new();
    collect_ids(&tree, &mut used);
    let filled = fill_missing_ids(&mut tree, &mut used);
    if filled > 0 {
        tracing::debug!(filled, "Assigned local ids to menu nodes without one");
    }
    serde_json::from_value(tree)
}

fn collect_ids(nodes: &Value, used: &mut HashSet<u64>) {
    let Value::Array(nodes) = nodes else {
        return;
    };
    for node in nodes {
        if let Some(id) = node.get("id").and_then(Value::as_u64) {
            used.insert(id);
        }
        if let Some(children) = node.get("children") {
            collect_ids(children, used);
        }
    }
}

fn fill_missing_ids(nodes: &mut Value, used: &mut HashSet<u64>) -> usize {
    let Value::Array(nodes) = nodes else {
        return 0;
    };
    let mut filled = 0;
    for node in nodes {
        let Value::Object(fields) = node else {
            continue;
        };
        if fields.get("id").is_none_or(Value::is_null) {
            let id = fresh_id(used);
            fields.insert("id".to_string(), Value::from(id));
            filled += 1;
        }
        if let Some(children) = fields.get_mut("children") {
            filled += fill_missing_ids(children, used);
        }
    }
    filled
}

fn fresh_id(used: &mut HashSet<u64>) -> MenuId {
    let id = if used.len() < LOCAL_ID_RANGE as usize / 2 {
        loop {
            let candidate = rand::random_range(0..LOCAL_ID_RANGE);
            if !used.contains(&u64::from(candidate)) {
                break candidate;
            }
        }
    } else {
        // Crowded range: take the first free id
        (0..MenuId::MAX)
            .find(|id| !used.contains(&u64::from(*id)))
            .unwrap_or(MenuId::MAX)
    };
    used.insert(u64::from(id));
    id
}

impl ApiClient {
    /// Load the navigation tree.
    ///
    /// The endpoint is public; the token is sent when there is one.
    pub async fn fetch_menu(&self, session: Option<&Session>) -> Result<Vec<MenuItem>, ApiError> {
        let response: MenuResponse = self.get_json("home/menu-items", session).await?;
        let items = decode_tree(response.data)?;
        tracing::info!(roots = items.len(), "Fetched menu");
        Ok(items)
    }

    /// Overwrite the stored menu with `payload`.
    pub async fn save_menu(
        &self,
        session: &Session,
        payload: &MenuSavePayload,
    ) -> Result<(), ApiError> {
        self.post_unit("admin/menus/store", payload, Some(session))
            .await?;
        tracing::info!(name = %payload.name, bytes = payload.menu.len(), "Saved menu");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_menu(body: serde_json::Value) -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/home/menu-items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let client = ApiClient::new(&format!("{}/api/", server.uri()), 5).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_fetch_menu_array() {
        let (_server, client) = serve_menu(serde_json::json!({
            "data": [{"id": 1, "label": "Home", "slug": "", "children": []}]
        }))
        .await;

        let items = client.fetch_menu(None).await.unwrap();
        assert_eq!(items, vec![MenuItem::new(1, "Home", "")]);
    }

    #[tokio::test]
    async fn test_fetch_menu_encoded_string() {
        let (_server, client) = serve_menu(serde_json::json!({
            "data": "[{\"id\":2,\"label\":\"News\",\"slug\":\"news\",\"isExpanded\":true,\"children\":[]}]"
        }))
        .await;

        let items = client.fetch_menu(None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_expanded);
    }

    #[tokio::test]
    async fn test_fetch_menu_missing_data_is_empty() {
        let (_server, client) = serve_menu(serde_json::json!({"data": null})).await;
        assert!(client.fetch_menu(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_menu_clean_shape_gets_ids() {
        let (_server, client) = serve_menu(serde_json::json!({
            "data": r#"[{"label":"Home","slug":"/","children":[{"label":"Team","slug":"/team"}]},{"label":"About","slug":"/about"}]"#
        }))
        .await;

        let items = client.fetch_menu(None).await.unwrap();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "About"]);
        assert_eq!(items[0].children[0].label, "Team");

        let ids = [items[0].id, items[0].children[0].id, items[1].id];
        assert!(ids.iter().all(|id| *id < LOCAL_ID_RANGE));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_filled_ids_avoid_existing_ones() {
        let data = serde_json::json!([
            {"id": 5, "label": "Kept", "slug": "", "children": [{"id": null, "label": "Null id"}]},
            {"label": "No id"}
        ]);
        let items = decode_tree(data).unwrap();

        assert_eq!(items[0].id, 5);
        let filled = [items[0].children[0].id, items[1].id];
        assert!(!filled.contains(&5));
        assert_ne!(filled[0], filled[1]);
    }

    #[test]
    fn test_fresh_id_in_crowded_range() {
        let mut used: HashSet<u64> = (0..u64::from(LOCAL_ID_RANGE)).collect();
        assert_eq!(fresh_id(&mut used), LOCAL_ID_RANGE);
        assert!(used.contains(&u64::from(LOCAL_ID_RANGE)));
    }

    #[tokio::test]
    async fn test_fetch_menu_garbage_is_decode_error() {
        let (_server, client) = serve_menu(serde_json::json!({"data": "{not json"})).await;
        assert!(matches!(
            client.fetch_menu(None).await,
            Err(ApiError::Decode(_))
        ));
    }
}

use super::client::{ApiClient, ApiError};
use crate::session::Session;
use serde::{Deserialize, Deserializer, Serialize};

/// A news category. `parent_id == 0` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub parent_id: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub position: i64,
    #[serde(default = "default_active", deserialize_with = "flag")]
    pub active: bool,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}

fn default_active() -> bool {
    true
}

fn null_as_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Accepts true/false, 1/0 and null (treated as active).
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => true,
    })
}

/// Body of the create/update call. A present `id` updates that category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub position: i64,
    pub parent_id: u64,
}

impl CategoryForm {
    /// Prefilled form for editing an existing category.
    pub fn edit(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            position: category.position,
            parent_id: category.parent_id,
        }
    }

    /// Blank form for a new category.
    pub fn create() -> Self {
        Self {
            position: 1,
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesResponse {
    Wrapped { data: Vec<Category> },
    Bare(Vec<Category>),
}

#[derive(Serialize)]
struct ToggleRequest {
    id: u64,
    active: bool,
}

impl ApiClient {
    pub async fn fetch_categories(&self, session: &Session) -> Result<Vec<Category>, ApiError> {
        let response: CategoriesResponse = self.get_json("admin/categories", Some(session)).await?;
        let categories = match response {
            CategoriesResponse::Wrapped { data } => data,
            CategoriesResponse::Bare(list) => list,
        };
        tracing::debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    /// Create a category, or update one when `form.id` is set.
    pub async fn save_category(&self, session: &Session, form: &CategoryForm) -> Result<(), ApiError> {
        self.post_unit("admin/categories", form, Some(session)).await?;
        tracing::info!(id = ?form.id, name = %form.name, "Saved category");
        Ok(())
    }

    pub async fn set_category_active(
        &self,
        session: &Session,
        id: u64,
        active: bool,
    ) -> Result<(), ApiError> {
        self.post_unit("admin/categories/toggle", &ToggleRequest { id, active }, Some(session))
            .await?;
        tracing::info!(id, active, "Toggled category");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_category_lenient_fields() {
        let json = r#"[
            {"id": 1, "name": "News", "slug": "news", "parent_id": 0, "position": 1, "active": 1},
            {"id": 2, "name": "Sports", "parent_id": null, "position": null, "active": false},
            {"id": 3, "name": "Campus", "parent_id": 1}
        ]"#;
        let cats: Vec<Category> = serde_json::from_str(json).unwrap();
        assert!(cats[0].active);
        assert!(cats[0].is_root());
        assert!(!cats[1].active);
        assert!(cats[1].is_root());
        assert!(cats[2].active);
        assert_eq!(cats[2].parent_id, 1);
        assert!(cats[2].slug.is_none());
    }

    #[test]
    fn test_create_form_omits_id() {
        let form = CategoryForm {
            name: "Opinion".to_string(),
            ..CategoryForm::create()
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "Opinion", "position": 1, "parent_id": 0})
        );
    }

    #[tokio::test]
    async fn test_fetch_categories_wrapped_and_bare() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 1, "name": "News", "parent_id": 0, "position": 1, "active": true}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api/", server.uri()), 5).unwrap();
        let session = Session::new(SecretString::from("t"));
        let cats = client.fetch_categories(&session).await.unwrap();
        assert_eq!(cats.len(), 1);

        let bare: CategoriesResponse =
            serde_json::from_str(r#"[{"id": 4, "name": "Tech"}]"#).unwrap();
        assert!(matches!(bare, CategoriesResponse::Bare(list) if list[0].id == 4));
    }

    #[tokio::test]
    async fn test_toggle_sends_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/categories/toggle"))
            .and(body_json(serde_json::json!({"id": 9, "active": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api/", server.uri()), 5).unwrap();
        let session = Session::new(SecretString::from("t"));
        client.set_category_active(&session, 9, false).await.unwrap();
    }
}

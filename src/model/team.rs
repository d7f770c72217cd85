use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub league: String,
    pub division: String,
    pub stadium_id: Option<Uuid>,
}

impl Team {
    pub fn placeholder(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            league: String::new(),
            division: String::new(),
            stadium_id: None,
        }
    }
}

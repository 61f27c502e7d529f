use serde::{Deserialize, Serialize};

/// One of the four Ikigai facets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IkigaiCategory {
    #[serde(rename = "whatILove")]
    WhatILove,
    #[serde(rename = "whatImGoodAt")]
    WhatImGoodAt,
    #[serde(rename = "whatTheWorldNeeds")]
    WhatTheWorldNeeds,
    #[serde(rename = "whatICanBePaidFor")]
    WhatICanBePaidFor,
}

impl IkigaiCategory {
    pub const ALL: [IkigaiCategory; 4] = [
        IkigaiCategory::WhatILove,
        IkigaiCategory::WhatImGoodAt,
        IkigaiCategory::WhatTheWorldNeeds,
        IkigaiCategory::WhatICanBePaidFor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IkigaiCategory::WhatILove => "What I Love",
            IkigaiCategory::WhatImGoodAt => "What I'm Good At",
            IkigaiCategory::WhatTheWorldNeeds => "What the World Needs",
            IkigaiCategory::WhatICanBePaidFor => "What I Can Be Paid For",
        }
    }
}

/// The accumulated answers of a user's Ikigai questionnaire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IkigaiData {
    #[serde(default)]
    pub what_i_love: Vec<String>,
    #[serde(default)]
    pub what_im_good_at: Vec<String>,
    #[serde(default)]
    pub what_the_world_needs: Vec<String>,
    #[serde(default)]
    pub what_i_can_be_paid_for: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl IkigaiData {
    pub fn items(&self, category: IkigaiCategory) -> &[String] {
        match category {
            IkigaiCategory::WhatILove => &self.what_i_love,
            IkigaiCategory::WhatImGoodAt => &self.what_im_good_at,
            IkigaiCategory::WhatTheWorldNeeds => &self.what_the_world_needs,
            IkigaiCategory::WhatICanBePaidFor => &self.what_i_can_be_paid_for,
        }
    }

    pub fn items_mut(&mut self, category: IkigaiCategory) -> &mut Vec<String> {
        match category {
            IkigaiCategory::WhatILove => &mut self.what_i_love,
            IkigaiCategory::WhatImGoodAt => &mut self.what_im_good_at,
            IkigaiCategory::WhatTheWorldNeeds => &mut self.what_the_world_needs,
            IkigaiCategory::WhatICanBePaidFor => &mut self.what_i_can_be_paid_for,
        }
    }

    /// All answers in category order.
    pub fn all_answers(&self) -> impl Iterator<Item = &String> {
        IkigaiCategory::ALL
            .into_iter()
            .flat_map(move |c| self.items(c).iter())
    }

    pub fn is_empty(&self) -> bool {
        self.all_answers().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_camel_case() {
        let data = IkigaiData {
            what_i_love: vec!["music".into()],
            what_i_can_be_paid_for: vec!["tutoring".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["whatILove"][0], "music");
        assert_eq!(json["whatImGoodAt"].as_array().unwrap().len(), 0);
        assert_eq!(json["whatICanBePaidFor"][0], "tutoring");
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_missing_lists_deserialize_empty() {
        let data: IkigaiData = serde_json::from_str(r#"{"whatTheWorldNeeds":["clean water"]}"#).unwrap();
        assert!(data.what_i_love.is_empty());
        assert_eq!(data.what_the_world_needs, vec!["clean water"]);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_category_serde_matches_field_names() {
        let c: IkigaiCategory = serde_json::from_str("\"whatImGoodAt\"").unwrap();
        assert_eq!(c, IkigaiCategory::WhatImGoodAt);
    }
}

use serde::Deserialize;

use super::repo_types::Lead;

pub const ALL_INDUSTRIES: &str = "all";

/// Dashboard search box plus industry dropdown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => {
                let s = s.to_lowercase();
                lead.company_name.to_lowercase().contains(&s)
                    || lead.contact_name.to_lowercase().contains(&s)
            }
            _ => true,
        };
        let industry_ok = match self.industry.as_deref() {
            None | Some(ALL_INDUSTRIES) | Some("") => true,
            Some(ind) => lead.industry == ind,
        };
        search_ok && industry_ok
    }

    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|l| self.matches(l)).collect()
    }
}

/// `all` followed by each distinct non-empty industry in first-seen order.
pub fn industries(leads: &[Lead]) -> Vec<String> {
    let mut out = vec![ALL_INDUSTRIES.to_string()];
    for lead in leads {
        if !lead.industry.is_empty() && !out.contains(&lead.industry) {
            out.push(lead.industry.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn lead(company: &str, contact: &str, industry: &str) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            lead_id: "LEAD-1-1".into(),
            company_name: company.into(),
            contact_name: contact.into(),
            email: String::new(),
            phone: String::new(),
            industry: industry.into(),
            location: String::new(),
            company_size: String::new(),
            revenue_range: String::new(),
            capital_need: String::new(),
            status: "available".into(),
            created_date: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn search_hits_company_or_contact_case_insensitively() {
        let leads = vec![
            lead("Acme Corp", "Wile", "Retail"),
            lead("Globex", "Hank Scorpio", "Energy"),
        ];
        let f = LeadFilter { search: Some("ACME".into()), industry: None };
        assert_eq!(f.apply(&leads).len(), 1);
        let f = LeadFilter { search: Some("scorp".into()), industry: None };
        assert_eq!(f.apply(&leads)[0].company_name, "Globex");
    }

    #[test]
    fn industry_all_means_no_filter() {
        let leads = vec![lead("A", "", "Retail"), lead("B", "", "Energy")];
        let f = LeadFilter { search: None, industry: Some("all".into()) };
        assert_eq!(f.apply(&leads).len(), 2);
        let f = LeadFilter { search: None, industry: Some("Energy".into()) };
        assert_eq!(f.apply(&leads)[0].company_name, "B");
    }

    #[test]
    fn industries_are_distinct_in_first_seen_order() {
        let leads = vec![
            lead("A", "", "Retail"),
            lead("B", "", ""),
            lead("C", "", "Energy"),
            lead("D", "", "Retail"),
        ];
        assert_eq!(industries(&leads), vec!["all", "Retail", "Energy"]);
    }
}

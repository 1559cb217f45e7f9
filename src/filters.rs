use crate::errors::{FilterError, ViewError};
use crate::models::{OptionItem, StatisticsSnapshot};
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Internal,
    Overseer,
    Custodian,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Internal => "Internal",
            Role::Overseer => "Overseer",
            Role::Custodian => "Custodian",
        }
    }

    pub fn can_edit(self, filter: FilterKind) -> bool {
        match (self, filter) {
            (_, FilterKind::TimePeriod) => true,
            (Role::Internal, _) => true,
            (Role::Overseer, FilterKind::Customer) => false,
            (Role::Overseer, _) => true,
            (Role::Custodian, _) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(Role::Internal),
            "overseer" => Ok(Role::Overseer),
            "custodian" => Ok(Role::Custodian),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    pub customer: Option<String>,
    pub region: Option<String>,
    pub terminal: Option<String>,
}

impl Assignments {
    fn get(&self, filter: FilterKind) -> Option<&str> {
        match filter {
            FilterKind::Customer => self.customer.as_deref(),
            FilterKind::Region => self.region.as_deref(),
            FilterKind::Terminal => self.terminal.as_deref(),
            FilterKind::TimePeriod => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    TimePeriod,
    Customer,
    Region,
    Terminal,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::TimePeriod,
        FilterKind::Customer,
        FilterKind::Region,
        FilterKind::Terminal,
    ];

    pub fn param(self) -> &'static str {
        match self {
            FilterKind::TimePeriod => "time-period",
            FilterKind::Customer => "customer",
            FilterKind::Region => "region",
            FilterKind::Terminal => "terminal",
        }
    }

    pub fn control_id(self) -> &'static str {
        match self {
            FilterKind::TimePeriod => "time-period",
            FilterKind::Customer => "customer-filter",
            FilterKind::Region => "region-filter",
            FilterKind::Terminal => "terminal-filter",
        }
    }

    fn all_label(self) -> &'static str {
        match self {
            FilterKind::Customer => "All Customers",
            FilterKind::Region => "All Regions",
            FilterKind::Terminal => "All Terminals",
            FilterKind::TimePeriod => "All Time",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.param() == value || kind.control_id() == value)
            .ok_or_else(|| FilterError::UnknownFilter(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePeriod {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    LastYear,
    #[default]
    AllTime,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 6] = [
        TimePeriod::Today,
        TimePeriod::Yesterday,
        TimePeriod::LastWeek,
        TimePeriod::LastMonth,
        TimePeriod::LastYear,
        TimePeriod::AllTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Today => "today",
            TimePeriod::Yesterday => "yesterday",
            TimePeriod::LastWeek => "lastweek",
            TimePeriod::LastMonth => "lastmonth",
            TimePeriod::LastYear => "lastyear",
            TimePeriod::AllTime => "all_time",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::Today => "Today",
            TimePeriod::Yesterday => "Yesterday",
            TimePeriod::LastWeek => "Last Week",
            TimePeriod::LastMonth => "Last Month",
            TimePeriod::LastYear => "Last Year",
            TimePeriod::AllTime => "All Time",
        }
    }
}

impl FromStr for TimePeriod {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        TimePeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == value)
            .ok_or_else(|| FilterError::UnknownOption {
                filter: FilterKind::TimePeriod,
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterValue {
    #[default]
    All,
    Id(String),
}

impl FilterValue {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => FilterValue::All,
            id => FilterValue::Id(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterValue::All => "all",
            FilterValue::Id(id) => id,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub time_period: TimePeriod,
    pub customer: FilterValue,
    pub region: FilterValue,
    pub terminal: FilterValue,
}

impl FilterState {
    pub fn initial(role: Role, assignments: &Assignments) -> Result<Self, ViewError> {
        let pick = |filter: FilterKind| -> Result<FilterValue, ViewError> {
            if role.can_edit(filter) {
                return Ok(FilterValue::All);
            }
            assignments
                .get(filter)
                .map(|id| FilterValue::Id(id.to_string()))
                .ok_or(ViewError::MissingAssignment { role, filter })
        };

        Ok(Self {
            time_period: TimePeriod::default(),
            customer: pick(FilterKind::Customer)?,
            region: pick(FilterKind::Region)?,
            terminal: pick(FilterKind::Terminal)?,
        })
    }

    pub fn value(&self, filter: FilterKind) -> &str {
        match filter {
            FilterKind::TimePeriod => self.time_period.as_str(),
            FilterKind::Customer => self.customer.as_str(),
            FilterKind::Region => self.region.as_str(),
            FilterKind::Terminal => self.terminal.as_str(),
        }
    }

    fn value_mut(&mut self, filter: FilterKind) -> Option<&mut FilterValue> {
        match filter {
            FilterKind::TimePeriod => None,
            FilterKind::Customer => Some(&mut self.customer),
            FilterKind::Region => Some(&mut self.region),
            FilterKind::Terminal => Some(&mut self.terminal),
        }
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            FilterKind::TimePeriod,
            FilterKind::Customer,
            FilterKind::Terminal,
            FilterKind::Region,
        ]
        .map(|filter| (filter.param(), self.value(filter).to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownSpec {
    pub filter: FilterKind,
    pub options: Vec<DropdownOption>,
    pub all_label: Option<&'static str>,
    pub initial: FilterValue,
    pub editable: bool,
}

impl DropdownSpec {
    fn build(
        filter: FilterKind,
        items: &[OptionItem],
        role: Role,
        initial: &FilterValue,
    ) -> Self {
        let editable = role.can_edit(filter);
        let options = match initial {
            FilterValue::Id(assigned) if !editable => {
                let own: Vec<DropdownOption> = items
                    .iter()
                    .filter(|item| item.id == *assigned)
                    .map(DropdownOption::from)
                    .collect();
                if own.is_empty() {
                    vec![DropdownOption {
                        id: assigned.clone(),
                        name: assigned.clone(),
                    }]
                } else {
                    own
                }
            }
            _ => items.iter().map(DropdownOption::from).collect(),
        };

        Self {
            filter,
            options,
            all_label: editable.then(|| filter.all_label()),
            initial: initial.clone(),
            editable,
        }
    }

    fn time_period() -> Self {
        Self {
            filter: FilterKind::TimePeriod,
            options: TimePeriod::ALL
                .into_iter()
                .map(|period| DropdownOption {
                    id: period.as_str().to_string(),
                    name: period.label().to_string(),
                })
                .collect(),
            all_label: None,
            initial: FilterValue::Id(TimePeriod::default().as_str().to_string()),
            editable: true,
        }
    }

    pub fn includes_all(&self) -> bool {
        self.all_label.is_some()
    }

    pub fn accepts(&self, value: &FilterValue) -> bool {
        match value {
            FilterValue::All => self.includes_all(),
            FilterValue::Id(id) => self.options.iter().any(|option| option.id == *id),
        }
    }

    pub fn entries(&self) -> Vec<DropdownOption> {
        let all = self.all_label.map(|label| DropdownOption {
            id: FilterValue::All.as_str().to_string(),
            name: label.to_string(),
        });
        all.into_iter().chain(self.options.iter().cloned()).collect()
    }
}

impl From<&OptionItem> for DropdownOption {
    fn from(item: &OptionItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPanel {
    role: Role,
    dropdowns: [DropdownSpec; 4],
    state: FilterState,
}

impl FilterPanel {
    pub fn new(
        snapshot: &StatisticsSnapshot,
        role: Role,
        assignments: &Assignments,
    ) -> Result<Self, ViewError> {
        let state = FilterState::initial(role, assignments)?;
        let dropdowns = [
            DropdownSpec::time_period(),
            DropdownSpec::build(FilterKind::Customer, &snapshot.customers, role, &state.customer),
            DropdownSpec::build(FilterKind::Region, &snapshot.regions, role, &state.region),
            DropdownSpec::build(FilterKind::Terminal, &snapshot.terminals, role, &state.terminal),
        ];

        Ok(Self {
            role,
            dropdowns,
            state,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn dropdowns(&self) -> &[DropdownSpec] {
        &self.dropdowns
    }

    pub fn dropdown(&self, filter: FilterKind) -> &DropdownSpec {
        let index = match filter {
            FilterKind::TimePeriod => 0,
            FilterKind::Customer => 1,
            FilterKind::Region => 2,
            FilterKind::Terminal => 3,
        };
        &self.dropdowns[index]
    }

    pub fn select(&mut self, filter: FilterKind, raw: &str) -> Result<(), FilterError> {
        let dropdown = self.dropdown(filter);
        if !dropdown.editable {
            return Err(FilterError::Locked { filter });
        }

        let value = FilterValue::parse(raw);
        if filter != FilterKind::TimePeriod && !dropdown.accepts(&value) {
            return Err(FilterError::UnknownOption {
                filter,
                value: value.to_string(),
            });
        }

        match self.state.value_mut(filter) {
            Some(slot) => *slot = value,
            None => self.state.time_period = raw.parse()?,
        }
        Ok(())
    }
}

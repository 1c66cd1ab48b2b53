//! The page transition table.
//!
//! Every page is a [`PageRule`] value; [`crate::transition::evaluate`] is the
//! single interpreter for all of them.

use crate::{Page, ResponseKind};
use slot_matcher::Slot;

/// Phrases that abandon the order from any page
pub const CANCEL_TRIGGERS: &[&str] = &["cancel"];

/// Whole words that decline an optional slot
pub const NEGATION_WORDS: &[&str] = &["no", "none", "nothing", "skip", "nope"];

/// Spoken when the user cancels
pub const CANCEL_PROMPT: &str = "Okay, Cancel ordering";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Lowercase the query before matching
    Folded,
    /// Match the query as received
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Keep only the last matching value
    Single,
    /// As `Single`, with triggers matched as whole words
    Word,
    /// Keep every matching value
    Multiple,
}

/// A slot filled from its dictionary on this page
#[derive(Debug, Clone, Copy)]
pub struct SlotBinding {
    pub slot: Slot,
    pub mode: MatchMode,
    /// A page with required bindings only advances when one of them matched
    pub required: bool,
}

/// Next page and response kind for a resolved utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: Page,
    pub kind: ResponseKind,
}

/// Keyword navigation: any trigger present moves to `step.next`
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub triggers: &'static [&'static str],
    pub step: Step,
}

/// Sends a specific single-match value somewhere other than `on_match`
#[derive(Debug, Clone, Copy)]
pub struct ValueRoute {
    pub slot: Slot,
    pub value: &'static str,
    pub next: Page,
}

/// What happens when local rules do not resolve the utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Repeat the page question
    Repeat,
    /// Ask the NLU service
    Nlu,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRule {
    pub page: Page,
    pub case: CaseMode,
    pub bindings: &'static [SlotBinding],
    /// Extract a pickup time ("12:30 pm", "asap") as the `time` slot
    pub capture_time: bool,
    pub on_match: Option<Step>,
    pub value_routes: &'static [ValueRoute],
    /// Only on pages whose slots are optional. When a route trigger also
    /// occurs, whichever comes first in the utterance decides.
    pub negation: Option<Step>,
    /// Checked in order, first hit wins
    pub routes: &'static [Route],
    pub fallback: Fallback,
    /// An empty query yields an empty prompt instead of repeating the question
    pub silent_when_empty: bool,
}

impl PageRule {
    const fn base(page: Page) -> Self {
        Self {
            page,
            case: CaseMode::Folded,
            bindings: &[],
            capture_time: false,
            on_match: None,
            value_routes: &[],
            negation: None,
            routes: &[],
            fallback: Fallback::Repeat,
            silent_when_empty: false,
        }
    }

    /// Prompt repeated when this page understood nothing
    pub fn prompt(&self) -> &'static str {
        self.page.prompt()
    }

    pub fn has_required_slot(&self) -> bool {
        self.capture_time || self.bindings.iter().any(|b| b.required)
    }
}

const fn select(next: Page) -> Option<Step> {
    Some(Step {
        next,
        kind: ResponseKind::Selecting,
    })
}

const fn perform(next: Page) -> Step {
    Step {
        next,
        kind: ResponseKind::Performing,
    }
}

const fn one(slot: Slot, required: bool) -> SlotBinding {
    SlotBinding {
        slot,
        mode: MatchMode::Single,
        required,
    }
}

const fn word(slot: Slot, required: bool) -> SlotBinding {
    SlotBinding {
        slot,
        mode: MatchMode::Word,
        required,
    }
}

const fn many(slot: Slot, required: bool) -> SlotBinding {
    SlotBinding {
        slot,
        mode: MatchMode::Multiple,
        required,
    }
}

const START_ROUTES: &[Route] = &[
    Route {
        triggers: &["recent", "again", "usual"],
        step: perform(Page::RecentOrders),
    },
    Route {
        triggers: &["address", "deliver"],
        step: perform(Page::Address),
    },
    Route {
        triggers: &["bag", "cart", "checkout", "check out"],
        step: perform(Page::Bag),
    },
    Route {
        triggers: &["menu", "order", "start", "hungry"],
        step: Step {
            next: Page::SelectItem,
            kind: ResponseKind::Selecting,
        },
    },
];

const START: PageRule = PageRule {
    routes: START_ROUTES,
    fallback: Fallback::Nlu,
    silent_when_empty: true,
    ..PageRule::base(Page::Start)
};

const HOME: PageRule = PageRule {
    page: Page::Home,
    ..START
};

const SELECT_ITEM: PageRule = PageRule {
    bindings: &[one(Slot::OrderType, true), word(Slot::Quantity, false)],
    on_match: select(Page::Fillings),
    value_routes: &[ValueRoute {
        slot: Slot::OrderType,
        value: "sides & drinks",
        next: Page::BreadChips,
    }],
    ..PageRule::base(Page::SelectItem)
};

const FILLINGS: PageRule = PageRule {
    bindings: &[many(Slot::Fillings, true)],
    on_match: select(Page::RiceBeans),
    ..PageRule::base(Page::Fillings)
};

const RICE_BEANS: PageRule = PageRule {
    bindings: &[one(Slot::Rice, false), one(Slot::Beans, false)],
    on_match: select(Page::Salsa),
    negation: Some(perform(Page::Salsa)),
    ..PageRule::base(Page::RiceBeans)
};

const SALSA: PageRule = PageRule {
    bindings: &[many(Slot::Salsa, false)],
    on_match: select(Page::Toppings),
    negation: Some(perform(Page::Toppings)),
    ..PageRule::base(Page::Salsa)
};

const TOPPINGS: PageRule = PageRule {
    bindings: &[many(Slot::Toppings, false)],
    on_match: select(Page::MoreToppings),
    negation: Some(perform(Page::MoreToppings)),
    ..PageRule::base(Page::Toppings)
};

const MORE_TOPPINGS: PageRule = PageRule {
    bindings: &[many(Slot::Toppings, false)],
    on_match: select(Page::BreadChips),
    negation: Some(perform(Page::BreadChips)),
    ..PageRule::base(Page::MoreToppings)
};

const BREAD_CHIPS: PageRule = PageRule {
    bindings: &[many(Slot::Sides, false), one(Slot::Tortilla, false)],
    on_match: select(Page::Drinks),
    negation: Some(perform(Page::Drinks)),
    ..PageRule::base(Page::BreadChips)
};

const DRINKS: PageRule = PageRule {
    bindings: &[many(Slot::Drinks, false)],
    on_match: select(Page::ConfirmAdd),
    negation: Some(perform(Page::ConfirmAdd)),
    ..PageRule::base(Page::Drinks)
};

const CONFIRM_ADD: PageRule = PageRule {
    negation: Some(perform(Page::SelectItem)),
    routes: &[Route {
        triggers: &["yes", "yeah", "sure", "add", "okay"],
        step: perform(Page::AddedToBag),
    }],
    ..PageRule::base(Page::ConfirmAdd)
};

const ADDED_TO_BAG: PageRule = PageRule {
    negation: Some(perform(Page::Bag)),
    routes: &[
        Route {
            triggers: &["checkout", "check out", "bag", "done", "that's it"],
            step: perform(Page::Bag),
        },
        Route {
            triggers: &["another", "more", "yes", "else"],
            step: perform(Page::SelectItem),
        },
    ],
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::AddedToBag)
};

const ADDRESS: PageRule = PageRule {
    bindings: &[one(Slot::Address, true)],
    on_match: select(Page::SelectItem),
    ..PageRule::base(Page::Address)
};

const RECENT_ORDERS: PageRule = PageRule {
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::RecentOrders)
};

const BAG: PageRule = PageRule {
    routes: &[
        Route {
            triggers: &["checkout", "check out", "pay", "place"],
            step: perform(Page::PickupTime),
        },
        Route {
            triggers: &["add", "more", "another"],
            step: perform(Page::SelectItem),
        },
    ],
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::Bag)
};

const PICKUP_TIME: PageRule = PageRule {
    capture_time: true,
    on_match: select(Page::Payment),
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::PickupTime)
};

const PAYMENT: PageRule = PageRule {
    bindings: &[one(Slot::Payment, true)],
    on_match: select(Page::ConfirmSubmit),
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::Payment)
};

const CONFIRM_SUBMIT: PageRule = PageRule {
    negation: Some(perform(Page::Bag)),
    routes: &[Route {
        triggers: &["yes", "yeah", "sure", "submit", "place"],
        step: perform(Page::OrderPlaced),
    }],
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::ConfirmSubmit)
};

const ORDER_PLACED: PageRule = PageRule {
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::OrderPlaced)
};

/// Codes the table does not know are leaves handed to the NLU service
const UNKNOWN: PageRule = PageRule {
    fallback: Fallback::Nlu,
    ..PageRule::base(Page::NoMatch)
};

static RULES: [PageRule; 19] = [
    HOME,
    START,
    SELECT_ITEM,
    FILLINGS,
    RICE_BEANS,
    SALSA,
    TOPPINGS,
    MORE_TOPPINGS,
    BREAD_CHIPS,
    DRINKS,
    CONFIRM_ADD,
    ADDED_TO_BAG,
    ADDRESS,
    RECENT_ORDERS,
    BAG,
    PICKUP_TIME,
    PAYMENT,
    CONFIRM_SUBMIT,
    ORDER_PLACED,
];

static UNKNOWN_RULE: PageRule = UNKNOWN;

/// Look up the rule for a wire page code
pub fn rule_for(code: u32) -> &'static PageRule {
    RULES
        .iter()
        .find(|rule| rule.page.code() == code)
        .unwrap_or(&UNKNOWN_RULE)
}

/// Every rule in the table, for inspection and tests
pub fn all_rules() -> &'static [PageRule] {
    &RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_except_no_match_has_a_rule() {
        for page in Page::ALL {
            let rule = rule_for(page.code());
            if page == Page::NoMatch {
                assert_eq!(rule.fallback, Fallback::Nlu);
            } else {
                assert_eq!(rule.page, page, "missing rule for {}", page);
            }
        }
        assert_eq!(all_rules().len(), Page::ALL.len() - 1);
    }

    #[test]
    fn test_unknown_codes_fall_back_to_nlu() {
        let rule = rule_for(4321);
        assert_eq!(rule.page, Page::NoMatch);
        assert_eq!(rule.fallback, Fallback::Nlu);
    }

    #[test]
    fn test_slot_pages_repeat_and_leaves_use_nlu() {
        for code in [1000, 1100, 1110, 1120, 1130, 1140, 1150, 1160, 1170, 2000] {
            assert_eq!(rule_for(code).fallback, Fallback::Repeat, "page {}", code);
        }
        for code in [0, 100, 1900, 3000, 5000, 6000, 6100, 6200, 7000] {
            assert_eq!(rule_for(code).fallback, Fallback::Nlu, "page {}", code);
        }
    }

    #[test]
    fn test_negation_only_on_optional_pages() {
        for rule in all_rules() {
            if rule.negation.is_some() {
                assert!(!rule.has_required_slot(), "{} negates a required slot", rule.page);
            }
        }
    }

    #[test]
    fn test_only_start_pages_stay_silent() {
        let silent: Vec<_> = all_rules()
            .iter()
            .filter(|r| r.silent_when_empty)
            .map(|r| r.page)
            .collect();
        assert_eq!(silent, vec![Page::Home, Page::Start]);
    }
}

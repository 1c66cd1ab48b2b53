//! Dialog pages and their wire codes.

use std::fmt;

/// A dialog position. The discriminant is the page code shared with the
/// client device and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Page {
    /// Cancelled, back at the home screen
    Home = 0,
    Start = 100,
    SelectItem = 1000,
    Fillings = 1100,
    RiceBeans = 1110,
    Salsa = 1120,
    Toppings = 1130,
    MoreToppings = 1140,
    BreadChips = 1150,
    Drinks = 1160,
    ConfirmAdd = 1170,
    AddedToBag = 1900,
    Address = 2000,
    RecentOrders = 3000,
    Bag = 5000,
    PickupTime = 6000,
    Payment = 6100,
    ConfirmSubmit = 6200,
    OrderPlaced = 7000,
    /// Nothing understood; repeat the current question
    NoMatch = 9999,
}

impl Page {
    pub const ALL: [Page; 20] = [
        Page::Home,
        Page::Start,
        Page::SelectItem,
        Page::Fillings,
        Page::RiceBeans,
        Page::Salsa,
        Page::Toppings,
        Page::MoreToppings,
        Page::BreadChips,
        Page::Drinks,
        Page::ConfirmAdd,
        Page::AddedToBag,
        Page::Address,
        Page::RecentOrders,
        Page::Bag,
        Page::PickupTime,
        Page::Payment,
        Page::ConfirmSubmit,
        Page::OrderPlaced,
        Page::NoMatch,
    ];

    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Page> {
        Page::ALL.iter().copied().find(|p| p.code() == code)
    }

    /// The question asked on arrival at this page
    pub fn prompt(self) -> &'static str {
        match self {
            Page::Home | Page::Start => {
                "Hi, welcome to Chipotle. You can say menu, address, or bag."
            }
            Page::SelectItem => {
                "What would you like? You can say burrito, bowl, tacos, salad, kid's meal, or sides and drinks."
            }
            Page::Fillings => "which fillings do you want?",
            Page::RiceBeans => "fillings added, Any rice or beans?",
            Page::Salsa => "Any salsa?",
            Page::Toppings => "Any toppings?",
            Page::MoreToppings => "Anything else on top, like guacamole or queso?",
            Page::BreadChips => "Any sides, like chips or a tortilla on the side?",
            Page::Drinks => "Any drinks?",
            Page::ConfirmAdd => "Okay, Do you want to add item to cart",
            Page::AddedToBag => {
                "Item added to your bag. Would you like anything else, or are you ready to check out?"
            }
            Page::Address => "please select address, you can say recent, favorite, or nearby",
            Page::RecentOrders => "Which recent order would you like?",
            Page::Bag => "Here is your bag. Say checkout when you are ready, or add more.",
            Page::PickupTime => "please tell me the pickup time",
            Page::Payment => "please tell me payment type, you can say google pay or credit card",
            Page::ConfirmSubmit => "Okay, Do you want to submit order?",
            Page::OrderPlaced => "Your order has been placed. Thank you!",
            Page::NoMatch => "Sorry, I didn't catch that. Please try again.",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

pub mod address;
pub mod cart_item;
pub mod product;
pub mod review;
pub mod user;
pub mod wishlist_item;

pub use address::{Address, AddressPatch, NewAddress};
pub use cart_item::{CartItem, CartLine};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch};
pub use review::{NewReview, Review, ReviewAuthor, ReviewPatch, ReviewWithAuthor};
pub use user::{NewUser, ProfilePatch, Role, User};
pub use wishlist_item::{WishlistItem, WishlistLine};

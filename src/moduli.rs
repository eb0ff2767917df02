//! # Moduli - Fixed RSA Groups
//!
//! Three trusted moduli of unknown factorization, embedded as decimal
//! literals and parsed once per process. RSA_2048 is the RSA Factoring
//! Challenge modulus, public since 1991 and unfactored. The 3072- and
//! 4096-bit moduli are products of two primes derived deterministically by
//! counter-mode SHA-512 expansion of the seeds "wesolowski-vdf-3072-v1" and
//! "wesolowski-vdf-4096-v1": each half fills bits/2 bits from the hash
//! stream, forces its top two bits and its low bit, and takes the least
//! probable prime at or above that value. Forcing the top two bits of both
//! halves pins the product's bit length exactly.
//!
//! The security of every proof rests on nobody knowing a factorization of
//! the modulus in use; anyone holding the factors can forge delays.

use std::sync::OnceLock;

use rug::Integer;

const RSA_2048_DECIMAL: &str = concat!(
    "2519590847565789349402718324004839857142928212620403202777713783604366202070",
    "7595556264018525880784406918290641249515082189298559149176184502808489120072",
    "8449926873928072877767359714183472702618963750149718246911650776133798590957",
    "0009733045974880842840179742910064245869181719511874612151517265463228221686",
    "9987549182422433637259085141865462043576798423387184774447920739934236584823",
    "8242811981638150106748104516603773060562016196762561338441436038339044149526",
    "3443219011465754445417842402092461651572335077870774981712577246796292638635",
    "6373289912154831438167899885040445364023527381951378636564391212010397122822",
    "120720357",
);

const RSA_3072_DECIMAL: &str = concat!(
    "4916197957872788318140427589476396135576717026289973619030900598568591645931",
    "0229118159606550352878116965039100740836914301492830031929033277491506699622",
    "5221310925048098346288499389028018829347331594238984982664035556752313494615",
    "6817041771579030518585840112879058466095030963469962611538588542623112355572",
    "9830412598977188605395684980440015757729047378805242839581330348052531642933",
    "9917397184905676331202978779291675426362762743817160920105834754072200739859",
    "3761141793925101117425466339527528662569282407269494019214384824405407162525",
    "7082643353413601598406885388851301807872775535985038479733229650720521454453",
    "2651935760263954594083088396210696602224525604969650247756068332743582044821",
    "2394625572228605573508741123573153570959917669914326762819224485104209169745",
    "6886932318534683823843546615145608367450603256090596023910642055941769911451",
    "9302286400278588699924825093374087454333687426382306543837775315299393932339",
    "2568565212019",
);

const RSA_4096_DECIMAL: &str = concat!(
    "7436959006785774982102853790877681361191313616713861057932577101908935858535",
    "1961111826059589846266298598908407196231977744851587691310422093855899477833",
    "0590694175825332469499327293611949173772790799169521387290726243090619546667",
    "3933216390385473269003702639620641596349572657807863782457598836897015089828",
    "2705622481028556089462237041397443781190464634164394763679898526969505356858",
    "7829486466844485884669514008768154955053594765340561105764319510024042880554",
    "8609499585553013048643883467828637679465645169925423816338488666793304457283",
    "2022067932428238830059592914913778952919983595354800027743682749883078411661",
    "7940381921934156479348973279131582820928805965508711855946115524179184055961",
    "5243122865888351709017563722076293281313665997711280370599644649769974056671",
    "7862459734195880719093949517535311940245609785988645204548517283102506179062",
    "5696357315773600147405152402463201252560040140016718052161802044961342641735",
    "4158009215469127606143619182368053008245948986820525208823559831129005293594",
    "9198516943526916944715038304715160204851483652650142416054346814497975623610",
    "6517822918016656488681134022803326968744540675863672094888963247070655103495",
    "5829994954542159637845991634144931748807886695643306312316460537065670225186",
    "64504317963630053",
);

fn parse_modulus(decimal: &str) -> Integer {
    Integer::from_str_radix(decimal, 10).expect("embedded modulus literal")
}

/// The RSA Factoring Challenge 2048-bit modulus (RSA-2048).
pub fn rsa_2048() -> &'static Integer {
    static N: OnceLock<Integer> = OnceLock::new();
    N.get_or_init(|| parse_modulus(RSA_2048_DECIMAL))
}

/// Deterministic 3072-bit modulus from the seed "wesolowski-vdf-3072-v1".
pub fn rsa_3072() -> &'static Integer {
    static N: OnceLock<Integer> = OnceLock::new();
    N.get_or_init(|| parse_modulus(RSA_3072_DECIMAL))
}

/// Deterministic 4096-bit modulus from the seed "wesolowski-vdf-4096-v1".
pub fn rsa_4096() -> &'static Integer {
    static N: OnceLock<Integer> = OnceLock::new();
    N.get_or_init(|| parse_modulus(RSA_4096_DECIMAL))
}

/*!

This is the long-form manual for `voting_sim` and `vsim`.

## Populations

A simulation places voters and candidates in the same ideological space. Every
axis of this space is an *issue*, and voters prefer the candidates nearest to
them (Euclidean distance). Distance ties are resolved in favour of the lower
candidate id.

The spread of the voters is controlled by the dispersion:

* `none` every voter sits at the origin
* `high` an isotropic normal distribution around the origin (standard deviation 5)
* `polarized-<k>` k cluster centers drawn uniformly in `[-10, 10]` on every axis,
  voters are split evenly between them and drawn around their center with the
  cluster spread (`clusterStd`, default 1)
* `centered`, `bipolar`, `tripolar` shorthands for `polarized-1`, `polarized-2`
  and `polarized-3`

The candidates follow the candidate scenario:

* `default` an isotropic normal distribution around the origin (standard deviation 5)
* `electorate` the same distribution as the voters, including the cluster centers

The same seed always gives the same population.

## Voting systems

### `plurality`

Each voter votes for its nearest candidate. The most votes wins.

### `majority`

Two-round system. A candidate with more than half of the votes wins in the
first round. Otherwise the two best candidates go to a runoff.

### `ranked-choice`

Instant-runoff voting (also `rcv` or `irv`). The weakest candidate is eliminated
and its voters move to their next choice, until one candidate holds more than
half of the ballots. On ties for the last place, the highest id is eliminated.

With `eliminationAlgorithm` set to `batch`, all the trailing candidates whose
combined votes cannot overtake the next candidate are eliminated in the same round.

### `proportional`

Seats (`seats`, default 349) are allocated from the first-preference votes.
Candidates below the threshold (`threshold`, a fraction of the electorate,
default 0.04) get no seat and their votes are not counted in the allocation.
Methods (`method`):

* `largest-remainder` Hare quota, leftover seats to the largest remainders (default)
* `dhondt` divisors 1, 2, 3, ...
* `sainte-lague` divisors 1, 3, 5, ...

### `approval`

Each voter approves its `approvals` nearest candidates (default 2). The most
approved candidate wins.

## Configuration

`vsim` reads an optional JSON configuration with the `--config` flag. Every
field is optional, and the command line flags take precedence.

```text
{
  "population": 10000,
  "candidates": 5,
  "issues": 2,
  "dispersion": "bipolar",
  "candidateScenario": "default",
  "clusterStd": 1.0,
  "seed": 42,
  "rules": [
    { "votingSystem": "plurality" },
    { "votingSystem": "ranked-choice", "eliminationAlgorithm": "batch" },
    { "votingSystem": "proportional", "seats": 100, "threshold": 0.05, "method": "dhondt" }
  ],
  "outputSettings": { "outputPath": "results.json", "label": "bipolar electorate" }
}
```

`electorateScenario` is accepted as another name for `dispersion`.

## Output

The summary is a JSON document with the resolved configuration (including the
seed, even when it was drawn at random) and one entry per voting system:
winners, tally, shares, the rounds of the count and the fairness of the outcome
(inverse of the mean distance between the voters and the winners).

 */
